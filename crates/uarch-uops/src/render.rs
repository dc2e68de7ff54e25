//! Disassembly-style rendering of micro-ops and basic blocks.
//!
//! Tracing and debugging aid only; the output is deterministic so golden
//! tests can rely on it, but it is not a compatibility surface and is never
//! on a hot path.

use crate::block::BasicBlock;
use crate::uop::TransOp;
use core::fmt;
use uarch_isa::{CondCode, OpClass, Opcode};

impl TransOp {
    /// Decorated mnemonic: opcode name plus size/condition/alignment/cache
    /// level suffixes and the `.p` internal marker.
    ///
    /// Unlike the typed accessors on [`TransOp`], selector decoding here is
    /// permissive: an out-of-domain `cond` renders a `???` placeholder so a
    /// malformed uop can still be dumped.
    pub fn mnemonic(&self) -> String {
        let op = self.opcode;
        let ldst = op.in_class(OpClass::LOAD | OpClass::STORE | OpClass::PREFETCH);
        let fp = op.in_class(OpClass::FP_ALU);
        let mut mn = String::from(op.name());
        mn.push_str(self.size.suffix(fp));

        if op.uses_cond() {
            mn.push('.');
            match CondCode::from_index(self.cond) {
                Some(cc) => mn.push_str(cc.name()),
                None => mn.push_str("???"),
            }
        }

        if ldst {
            match self.cond {
                1 => mn.push_str(".low"),
                2 => mn.push_str(".high"),
                _ => {}
            }
            if self.cachelevel > 0 {
                mn.push_str(".L");
                mn.push((b'1' + self.cachelevel) as char);
            }
        } else if op == Opcode::Mask {
            match self.cond {
                0 => {}
                1 => mn.push_str(".z"),
                2 => mn.push_str(".x"),
                _ => mn.push_str(".???"),
            }
        }

        if self.internal {
            mn.push_str(".p");
        }

        mn
    }
}

impl fmt::Display for TransOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.opcode;
        let ldst = op.is_load() || op.is_store();

        let mut mn = self.mnemonic();
        if self.eom {
            mn.push('.');
        }
        write!(f, "{mn:<12} {} = ", self.rd)?;

        if ldst {
            f.write_str("[")?;
        }
        write!(f, "{}", self.ra)?;
        if self.rb_is_imm() {
            write!(f, ",{}", self.rbimm)?;
        } else {
            write!(f, ",{}", self.rb)?;
        }
        if ldst {
            f.write_str("]")?;
        }

        if matches!(op, Opcode::Mask | Opcode::Maskb) {
            let mc = self.mask_descriptor();
            // maskb fields are byte-granular.
            let sh = if op == Opcode::Maskb { 3 } else { 0 };
            write!(
                f,
                ",[ms={} mc={} ds={}]",
                mc.ms >> sh,
                mc.mc >> sh,
                mc.ds >> sh
            )?;
        } else if !self.rc.is_zero() {
            if self.rc_is_imm() {
                write!(f, ",{}", self.rcimm)?;
            } else {
                write!(f, ",{}", self.rc)?;
            }
        }

        if matches!(op, Opcode::Adda | Opcode::Suba) && self.extshift != 0 {
            write!(f, "*{}", 1u32 << self.extshift)?;
        }

        if !self.setflags.is_empty() {
            write!(f, " [{}] ", self.setflags.annotation())?;
        }

        if op.is_branch() {
            write!(f, " [taken {:#x}, seq {:#x}]", self.riptaken, self.ripseq)?;
        }

        if self.som {
            write!(
                f,
                " ({}b {}t {}s {}l {}br)",
                self.bytes, self.tagcount, self.storecount, self.loadcount, self.branchcount
            )?;
        }

        Ok(())
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BasicBlock {:#x}: {} uops ({}t {}m {}s",
            self.rip,
            self.count(),
            self.tagcount,
            self.memcount,
            self.storecount
        )?;
        if self.repblock {
            f.write_str(" rep")?;
        }
        writeln!(
            f,
            ", uses {:#018x}), {} refs, {:#x} taken, {:#x} not taken:",
            self.usedregs,
            self.refcount(),
            self.rip_taken,
            self.rip_not_taken
        )?;

        // Reconstruct the per-instruction rip from the macro-op byte lengths.
        let mut rip = self.rip;
        let mut bytes_in_insn = 0u64;
        for uop in self.uops() {
            write!(f, "  {rip:#x}: {uop}")?;
            if uop.som {
                write!(f, " [som bytes {}]", uop.bytes)?;
                bytes_in_insn = uop.bytes as u64;
            }
            if uop.eom {
                f.write_str(" [eom]")?;
                rip += bytes_in_insn;
            }
            writeln!(f)?;
        }

        writeln!(
            f,
            "Basic block terminates with taken rip {:#x}, not taken rip {:#x}",
            self.rip_taken, self.rip_not_taken
        )
    }
}
