//! The micro-op instance type and its opcode-aware accessors.

use uarch_isa::{ArchReg, CondCode, OpClass, Opcode, SetFlags};

/// Operand size tag.
///
/// For integer opcodes this is the usual byte/word/dword/qword selector. For
/// FP-ALU opcodes the same two bits select scalar-single / packed-single /
/// scalar-double / packed-double, and for `cmpccf` and the conversions they
/// select ordered/unordered and rounding/truncation variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum OpSize {
    Byte = 0,
    Word = 1,
    Dword = 2,
    #[default]
    Qword = 3,
}

impl OpSize {
    pub fn from_index(index: u8) -> Option<OpSize> {
        match index {
            0 => Some(OpSize::Byte),
            1 => Some(OpSize::Word),
            2 => Some(OpSize::Dword),
            3 => Some(OpSize::Qword),
            _ => None,
        }
    }

    /// Mnemonic suffix: b/w/d/(none) for integer ops, ss/ps/sd/pd for FP.
    pub fn suffix(self, fp: bool) -> &'static str {
        const INT: [&str; 4] = ["b", "w", "d", ""];
        const FP: [&str; 4] = ["ss", "ps", "sd", "pd"];
        if fp {
            FP[self as usize]
        } else {
            INT[self as usize]
        }
    }

    pub fn bytes(self) -> usize {
        1 << (self as usize)
    }
}

/// Load/store alignment variant, selected by the `cond` field of ld/st ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LdStAlign {
    Normal = 0,
    /// Low half of an unaligned pair.
    Lo = 1,
    /// High half of an unaligned pair.
    Hi = 2,
}

/// Zero/sign-extension variant for mask opcodes, selected by `cond`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MaskExt {
    None = 0,
    Zero = 1,
    Sign = 2,
}

/// Unpacked mask-control descriptor carried in `rcimm` by `mask`/`maskb`.
///
/// Three 6-bit fields: `ms` (extract start), `mc` (mask bit count), `ds`
/// (destination shift). `maskb` interprets them at byte granularity
/// (renders them divided by 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaskControl {
    pub ms: u8,
    pub mc: u8,
    pub ds: u8,
}

impl MaskControl {
    pub const FIELD_BITS: u32 = 6;

    pub fn new(ms: u8, mc: u8, ds: u8) -> MaskControl {
        assert!(ms < 64 && mc < 64 && ds < 64, "mask control field overflow");
        MaskControl { ms, mc, ds }
    }

    /// Pack into the low 18 bits of an `rcimm` value.
    pub fn pack(self) -> i64 {
        (self.ms as i64) | ((self.mc as i64) << 6) | ((self.ds as i64) << 12)
    }

    /// Unpack from an `rcimm` value; bits above the three fields are ignored.
    pub fn unpack(rcimm: i64) -> MaskControl {
        MaskControl {
            ms: (rcimm & 0x3f) as u8,
            mc: ((rcimm >> 6) & 0x3f) as u8,
            ds: ((rcimm >> 12) & 0x3f) as u8,
        }
    }
}

/// A translated micro-op: fixed format, three source operand slots.
///
/// `ra` is always a register. `rb` and `rc` are registers unless they hold
/// [`ArchReg::IMM`], in which case the corresponding `rbimm`/`rcimm` field
/// carries the literal. For `mask`/`maskb`, `rcimm` is a packed
/// [`MaskControl`] descriptor instead of a plain immediate. There is no
/// out-of-band type tag; interpretation is entirely opcode-driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransOp {
    pub opcode: Opcode,
    pub size: OpSize,
    /// Overloaded selector: condition code for branch/select/check opcodes,
    /// alignment variant for loads/stores, extension variant for masks.
    pub cond: u8,
    pub rd: ArchReg,
    pub ra: ArchReg,
    pub rb: ArchReg,
    pub rc: ArchReg,
    pub rbimm: i64,
    pub rcimm: i64,
    /// Which flag groups this op defines.
    pub setflags: SetFlags,
    /// 0 = default; 1..3 = leveled/locked cache hint for loads and stores.
    pub cachelevel: u8,
    /// Index-scale shift for `adda`/`suba` (scaled address generation).
    pub extshift: u8,
    /// Simulator-private op with no architectural counterpart.
    pub internal: bool,
    /// First micro-op of its macro-op.
    pub som: bool,
    /// Last micro-op of its macro-op.
    pub eom: bool,
    /// Length in bytes of the originating macro-instruction (som only).
    pub bytes: u8,
    /// Per-macro-op result counts, valid on the som micro-op only.
    pub tagcount: u8,
    pub loadcount: u8,
    pub storecount: u8,
    pub branchcount: u8,
    /// Successor rip if the branch is taken (branch opcodes only).
    pub riptaken: u64,
    /// Fall-through rip (branch opcodes only).
    pub ripseq: u64,
}

impl TransOp {
    /// Build a micro-op with all control fields cleared; the translator fills
    /// in flags, markers and branch targets afterwards.
    pub fn new(
        opcode: Opcode,
        rd: ArchReg,
        ra: ArchReg,
        rb: ArchReg,
        rc: ArchReg,
        rbimm: i64,
        rcimm: i64,
    ) -> TransOp {
        TransOp {
            opcode,
            size: OpSize::Qword,
            cond: 0,
            rd,
            ra,
            rb,
            rc,
            rbimm,
            rcimm,
            setflags: SetFlags::empty(),
            cachelevel: 0,
            extshift: 0,
            internal: false,
            som: false,
            eom: false,
            bytes: 0,
            tagcount: 0,
            loadcount: 0,
            storecount: 0,
            branchcount: 0,
            riptaken: 0,
            ripseq: 0,
        }
    }

    /// True iff the `rb` slot carries `rbimm` rather than a register.
    pub fn rb_is_imm(&self) -> bool {
        self.rb.is_imm()
    }

    /// True iff the `rc` slot carries `rcimm` rather than a register.
    pub fn rc_is_imm(&self) -> bool {
        self.rc.is_imm()
    }

    /// Issue-to-completion latency in cycles for this op.
    pub fn effective_latency(&self) -> u32 {
        self.opcode.info().latency
    }

    /// Which flag groups this op defines, for the dependency tracker.
    pub fn flags_written(&self) -> SetFlags {
        self.setflags
    }

    /// The mask-control descriptor packed in `rcimm`.
    ///
    /// # Panics
    /// If the opcode is not `mask`/`maskb`: the slot holds a plain immediate
    /// there and decoding it as a descriptor is a translator bug.
    pub fn mask_descriptor(&self) -> MaskControl {
        assert!(
            matches!(self.opcode, Opcode::Mask | Opcode::Maskb),
            "mask_descriptor on non-mask opcode {}",
            self.opcode
        );
        MaskControl::unpack(self.rcimm)
    }

    /// The condition code selected by `cond`.
    ///
    /// # Panics
    /// If the opcode class does not use condition codes, or `cond` is out of
    /// range.
    pub fn branch_cond(&self) -> CondCode {
        assert!(
            self.opcode.uses_cond(),
            "cond field of {} does not hold a condition code",
            self.opcode
        );
        match CondCode::from_index(self.cond) {
            Some(cc) => cc,
            None => panic!("invalid condition code {} on {}", self.cond, self.opcode),
        }
    }

    /// The alignment variant selected by `cond`.
    ///
    /// # Panics
    /// If the opcode is not a load, store or prefetch.
    pub fn ldst_align(&self) -> LdStAlign {
        assert!(
            self.opcode
                .in_class(OpClass::LOAD | OpClass::STORE | OpClass::PREFETCH),
            "cond field of {} does not hold an alignment variant",
            self.opcode
        );
        match self.cond {
            0 => LdStAlign::Normal,
            1 => LdStAlign::Lo,
            2 => LdStAlign::Hi,
            other => panic!("invalid alignment variant {other} on {}", self.opcode),
        }
    }

    /// The extension variant selected by `cond`.
    ///
    /// # Panics
    /// If the opcode is not `mask`/`maskb`.
    pub fn mask_ext(&self) -> MaskExt {
        assert!(
            matches!(self.opcode, Opcode::Mask | Opcode::Maskb),
            "cond field of {} does not hold an extension variant",
            self.opcode
        );
        match self.cond {
            0 => MaskExt::None,
            1 => MaskExt::Zero,
            2 => MaskExt::Sign,
            other => panic!("invalid mask extension {other} on {}", self.opcode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uarch_isa::LOAD_LATENCY;

    fn op(opcode: Opcode) -> TransOp {
        TransOp::new(
            opcode,
            ArchReg::RAX,
            ArchReg::RBX,
            ArchReg::RCX,
            ArchReg::ZERO,
            0,
            0,
        )
    }

    #[test]
    fn immediate_slots_follow_the_sentinel() {
        let mut add = op(Opcode::Add);
        assert!(!add.rb_is_imm());
        add.rb = ArchReg::IMM;
        add.rbimm = -16;
        assert!(add.rb_is_imm());
        assert!(!add.rc_is_imm());
    }

    #[test]
    fn load_latency_differs_from_alu_latency() {
        assert_eq!(op(Opcode::Ld).effective_latency(), LOAD_LATENCY);
        assert_eq!(op(Opcode::Add).effective_latency(), 1);
        assert_eq!(op(Opcode::Mull).effective_latency(), 4);
    }

    #[test]
    fn flags_written_decodes_setflags() {
        let mut sub = op(Opcode::Sub);
        sub.setflags = SetFlags::ZF | SetFlags::OF;
        assert_eq!(sub.flags_written(), SetFlags::ZF | SetFlags::OF);
        assert!(!sub.flags_written().contains(SetFlags::CF));
    }

    #[test]
    fn empty_mask_descriptor_decodes_without_error() {
        let mut mask = op(Opcode::Mask);
        mask.rcimm = MaskControl::new(0, 0, 0).pack();
        assert_eq!(mask.mask_descriptor(), MaskControl { ms: 0, mc: 0, ds: 0 });
    }

    #[test]
    fn mask_descriptor_round_trips() {
        let mc = MaskControl::new(17, 42, 63);
        assert_eq!(MaskControl::unpack(mc.pack()), mc);
    }

    #[test]
    #[should_panic(expected = "mask_descriptor on non-mask opcode")]
    fn mask_descriptor_rejects_other_opcodes() {
        let _ = op(Opcode::Add).mask_descriptor();
    }

    #[test]
    fn cond_field_accessors_are_class_gated() {
        let mut br = op(Opcode::Br);
        br.cond = CondCode::Nle as u8;
        assert_eq!(br.branch_cond(), CondCode::Nle);

        let mut ld = op(Opcode::Ld);
        ld.cond = 1;
        assert_eq!(ld.ldst_align(), LdStAlign::Lo);

        let mut maskb = op(Opcode::Maskb);
        maskb.cond = 2;
        assert_eq!(maskb.mask_ext(), MaskExt::Sign);
    }

    #[test]
    #[should_panic(expected = "does not hold a condition code")]
    fn branch_cond_rejects_loads() {
        let _ = op(Opcode::Ld).branch_cond();
    }

    #[test]
    fn op_size_suffixes() {
        assert_eq!(OpSize::Byte.suffix(false), "b");
        assert_eq!(OpSize::Qword.suffix(false), "");
        assert_eq!(OpSize::Byte.suffix(true), "ss");
        assert_eq!(OpSize::Qword.suffix(true), "pd");
        assert_eq!(OpSize::Dword.bytes(), 4);
    }
}
