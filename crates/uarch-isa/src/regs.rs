//! Register identifiers and the register name table.
//!
//! Micro-ops address an 80-entry flat register file: the 64 architectural
//! registers (GPRs, SSE register halves, x87/MMX state, specials) followed by
//! 16 identifiers that exist only during translation and renaming — the
//! temporaries `tr0..tr10`, the flag pseudo-registers `zf`/`cf`/`of` tracked
//! as independent rename targets, and the `imm`/`mem` operand-slot sentinels.

use core::fmt;

/// Architectural registers proper (everything before the translation-time ids).
pub const ARCH_REG_COUNT: usize = 64;
/// Full register file as seen by micro-ops, including translation-time ids.
pub const TRANS_REG_COUNT: usize = 80;

/// Index-aligned register names, consumed by disassembly and trace parsers.
pub const ARCH_REG_NAMES: [&str; TRANS_REG_COUNT] = [
    // Integer registers
    "rax", "rcx", "rdx", "rbx", "rsp", "rbp", "rsi", "rdi",
    "r8", "r9", "r10", "r11", "r12", "r13", "r14", "r15",
    // SSE registers, split into low/high 64-bit halves
    "xmml0", "xmmh0", "xmml1", "xmmh1", "xmml2", "xmmh2", "xmml3", "xmmh3",
    "xmml4", "xmmh4", "xmml5", "xmmh5", "xmml6", "xmmh6", "xmml7", "xmmh7",
    "xmml8", "xmmh8", "xmml9", "xmmh9", "xmml10", "xmmh10", "xmml11", "xmmh11",
    "xmml12", "xmmh12", "xmml13", "xmmh13", "xmml14", "xmmh14", "xmml15", "xmmh15",
    // x87 FP / MMX
    "fptos", "fpsw", "fpcw", "fptags", "fp4", "fp5", "fp6", "fp7",
    // Special
    "rip", "flags", "sr3", "mxcsr", "sr0", "sr1", "sr2", "zero",
    // Translation and renaming only
    "tr0", "tr1", "tr2", "tr3", "tr4", "tr5", "tr6", "tr7",
    "zf", "cf", "of", "imm", "mem", "tr8", "tr9", "tr10",
];

/// A register id in the flat micro-op register file.
///
/// Kept as a raw index rather than an enum: ids come straight out of the
/// fixed-width micro-op encoding and may in principle be out of range when a
/// translator is buggy. [`ArchReg::name`] renders such ids as a placeholder
/// instead of reading out of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchReg(pub u8);

impl ArchReg {
    pub const RAX: ArchReg = ArchReg(0);
    pub const RCX: ArchReg = ArchReg(1);
    pub const RDX: ArchReg = ArchReg(2);
    pub const RBX: ArchReg = ArchReg(3);
    pub const RSP: ArchReg = ArchReg(4);
    pub const RBP: ArchReg = ArchReg(5);
    pub const RSI: ArchReg = ArchReg(6);
    pub const RDI: ArchReg = ArchReg(7);
    pub const R8: ArchReg = ArchReg(8);
    pub const R9: ArchReg = ArchReg(9);
    pub const R10: ArchReg = ArchReg(10);
    pub const R11: ArchReg = ArchReg(11);
    pub const R12: ArchReg = ArchReg(12);
    pub const R13: ArchReg = ArchReg(13);
    pub const R14: ArchReg = ArchReg(14);
    pub const R15: ArchReg = ArchReg(15);

    pub const XMML0: ArchReg = ArchReg(16);
    pub const XMMH0: ArchReg = ArchReg(17);

    pub const FPTOS: ArchReg = ArchReg(48);
    pub const FPSW: ArchReg = ArchReg(49);
    pub const FPCW: ArchReg = ArchReg(50);
    pub const FPTAGS: ArchReg = ArchReg(51);

    pub const RIP: ArchReg = ArchReg(56);
    pub const FLAGS: ArchReg = ArchReg(57);
    pub const MXCSR: ArchReg = ArchReg(59);
    /// Hardwired zero; also the "no destination" / "slot unused" id.
    pub const ZERO: ArchReg = ArchReg(63);

    pub const TR0: ArchReg = ArchReg(64);
    pub const TR7: ArchReg = ArchReg(71);
    /// Last writer of the ZAPS flag group.
    pub const ZF: ArchReg = ArchReg(72);
    /// Last writer of the carry flag.
    pub const CF: ArchReg = ArchReg(73);
    /// Last writer of the overflow flag.
    pub const OF: ArchReg = ArchReg(74);
    /// Operand-slot sentinel: the slot holds an immediate, not a register.
    pub const IMM: ArchReg = ArchReg(75);
    /// Operand-slot sentinel: the slot is filled in by the load-store unit.
    pub const MEM: ArchReg = ArchReg(76);
    pub const TR8: ArchReg = ArchReg(77);
    pub const TR9: ArchReg = ArchReg(78);
    pub const TR10: ArchReg = ArchReg(79);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// True for ids within the 80-entry register file.
    pub fn is_valid(self) -> bool {
        self.index() < TRANS_REG_COUNT
    }

    /// True for the architectural (committed-state) registers.
    pub fn is_arch(self) -> bool {
        self.index() < ARCH_REG_COUNT
    }

    pub fn is_imm(self) -> bool {
        self == Self::IMM
    }

    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// Register name, or a placeholder for ids outside the register file.
    pub fn name(self) -> &'static str {
        ARCH_REG_NAMES.get(self.index()).copied().unwrap_or("?")
    }
}

impl fmt::Display for ArchReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
