//! Micro-op opcodes and their static metadata.
//!
//! One table drives everything the out-of-order engine needs to know about an
//! opcode: its classification, its base latency, which operand slots it
//! actually reads, which slots feed the x86 condition-code computation, and
//! which functional units may execute it. The enum, the name table and the
//! metadata table are generated from a single declarative list so the three
//! can never drift out of step.

use crate::unit::UnitMask;
use bitflags::bitflags;
use core::fmt;

/// Generic single-cycle ALU latency, assuming a fast bypass network.
pub const ALU_LATENCY: u32 = 1;
/// L1-hit load-to-use latency; loads carry this instead of [`ALU_LATENCY`].
pub const LOAD_LATENCY: u32 = 2;

bitflags! {
    /// Opcode classification bitset.
    ///
    /// Exactly one primary class bit is set per opcode; `BARRIER` is a
    /// modifier marking simulator-internal control flow that fences the
    /// pipeline.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpClass: u32 {
        const LOGIC         = 1 << 0;
        const ADDSUB        = 1 << 1;
        const ADDSUB_CARRY  = 1 << 2;
        const ADDSHIFT      = 1 << 3;
        const SELECT        = 1 << 4;
        const COMPARE       = 1 << 5;
        const COND_BRANCH   = 1 << 6;
        const INDIR_BRANCH  = 1 << 7;
        const UNCOND_BRANCH = 1 << 8;
        const ASSIST        = 1 << 9;
        const LOAD          = 1 << 10;
        const STORE         = 1 << 11;
        const PREFETCH      = 1 << 12;
        const SIMPLE_SHIFT  = 1 << 13;
        const SHIFTROT      = 1 << 14;
        const MULTIPLY      = 1 << 15;
        const BITSCAN       = 1 << 16;
        const FLAGS         = 1 << 17;
        const CHECK         = 1 << 18;
        const FP_ALU        = 1 << 19;
        const FP_DIVSQRT    = 1 << 20;
        const FP_COMPARE    = 1 << 21;
        const FP_PERMUTE    = 1 << 22;
        const FP_CVT_I2F    = 1 << 23;
        const FP_CVT_F2I    = 1 << 24;
        const FP_CVT_F2F    = 1 << 25;
        /// Modifier: internal-only control flow that fences the pipeline.
        const BARRIER       = 1 << 26;

        /// All primary (mutually exclusive) class bits.
        const PRIMARY = (1 << 26) - 1;
        /// Any branch, conditional or not.
        const BRANCH = Self::COND_BRANCH.bits()
            | Self::INDIR_BRANCH.bits()
            | Self::UNCOND_BRANCH.bits();
        /// Classes whose `cond` field selects one of the 16 condition codes.
        const USES_COND = Self::COND_BRANCH.bits()
            | Self::SELECT.bits()
            | Self::CHECK.bits();
        /// Any floating-point class.
        const FP = Self::FP_ALU.bits()
            | Self::FP_DIVSQRT.bits()
            | Self::FP_COMPARE.bits()
            | Self::FP_PERMUTE.bits()
            | Self::FP_CVT_I2F.bits()
            | Self::FP_CVT_F2I.bits()
            | Self::FP_CVT_F2F.bits();
    }
}

/// Class names, index-aligned with the primary class bit positions.
pub const OPCLASS_NAMES: [&str; 26] = [
    "logic", "addsub", "addsubc", "addshift", "sel", "cmp", "br.cc", "jmp", "bru",
    "assist", "ld", "st", "ld.pre", "shiftsimple", "shift", "mul", "bitscan", "flags", "chk",
    "fpu", "fp-div-sqrt", "fp-cmp", "fp-perm", "fp-cvt-i2f", "fp-cvt-f2i", "fp-cvt-f2f",
];

impl OpClass {
    /// The classification with modifier bits stripped.
    pub fn primary(self) -> OpClass {
        self & OpClass::PRIMARY
    }

    /// Name of the (single) primary class bit.
    pub fn primary_name(self) -> &'static str {
        let bits = self.primary().bits();
        if bits.count_ones() != 1 {
            return "?";
        }
        OPCLASS_NAMES[bits.trailing_zeros() as usize]
    }
}

bitflags! {
    /// Which operand slots an opcode reads, and which of them feed the x86
    /// condition-code computation.
    ///
    /// The low three bits are the condition-code consumers, the next three
    /// the plain data reads, mirroring the packed encoding the renamer
    /// dispatches on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OperandUse: u8 {
        const CC_RA = 1 << 0;
        const CC_RB = 1 << 1;
        const CC_RC = 1 << 2;
        const RA = 1 << 3;
        const RB = 1 << 4;
        const RC = 1 << 5;

        const OP_A   = Self::RA.bits();
        const OP_B   = Self::RB.bits();
        const OP_AB  = Self::RA.bits() | Self::RB.bits();
        const OP_ABC = Self::RA.bits() | Self::RB.bits() | Self::RC.bits();
        const CC_A   = Self::CC_RA.bits();
        const CC_AB  = Self::CC_RA.bits() | Self::CC_RB.bits();
        const CC_ABC = Self::CC_RA.bits() | Self::CC_RB.bits() | Self::CC_RC.bits();
        const CC_C   = Self::CC_RC.bits();
    }
}

/// Static per-opcode facts, immutable for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub name: &'static str,
    pub class: OpClass,
    /// Base latency in cycles. Loads carry [`LOAD_LATENCY`].
    pub latency: u32,
    pub usage: OperandUse,
    pub units: UnitMask,
}

macro_rules! opcodes {
    ($($variant:ident = $name:literal : $class:expr, $lat:expr, $usage:expr, $units:expr;)+) => {
        /// A micro-op opcode. The discriminant is the index into
        /// [`OPCODE_NAMES`] and the metadata table.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u8)]
        pub enum Opcode {
            $($variant),+
        }

        /// Index-aligned opcode mnemonics, consumed by tracing and by
        /// external tools parsing simulator trace logs.
        pub const OPCODE_NAMES: [&str; Opcode::COUNT] = [$($name),+];

        static OPCODE_INFO: [OpcodeInfo; Opcode::COUNT] = [
            $(OpcodeInfo {
                name: $name,
                class: $class,
                latency: $lat,
                usage: $usage,
                units: $units,
            }),+
        ];

        impl Opcode {
            pub const COUNT: usize = [$($name),+].len();

            pub const ALL: [Opcode; Self::COUNT] = [$(Opcode::$variant),+];
        }
    };
}

// Shorthand used only by the table below.
const A: u32 = ALU_LATENCY;
const L: u32 = LOAD_LATENCY;

use self::OpClass as C;
use self::OperandUse as U;
use crate::unit::UnitMask as F;

const ANY_INT_FPU: UnitMask = F::ANY_INT.union(F::ANY_FPU);
const ALU_LDU: UnitMask = F::ANY_ALU.union(F::ANY_LDU);
const OP_ABC_CC_C: OperandUse = U::OP_ABC.union(U::CC_C);
const OP_ABC_CC_ABC: OperandUse = U::OP_ABC.union(U::CC_ABC);
const OP_AB_CC_AB: OperandUse = U::OP_AB.union(U::CC_AB);
const OP_A_CC_A: OperandUse = U::OP_A.union(U::CC_A);

opcodes! {
    Nop        = "nop":          C::LOGIC, A, U::empty(), ANY_INT_FPU;
    Mov        = "mov":          C::LOGIC, A, U::OP_AB, ANY_INT_FPU; // move or merge
    // Logical
    And        = "and":          C::LOGIC, A, U::OP_AB, ANY_INT_FPU;
    Andnot     = "andnot":       C::LOGIC, A, U::OP_AB, ANY_INT_FPU;
    Xor        = "xor":          C::LOGIC, A, U::OP_AB, ANY_INT_FPU;
    Or         = "or":           C::LOGIC, A, U::OP_AB, ANY_INT_FPU;
    Nand       = "nand":         C::LOGIC, A, U::OP_AB, ANY_INT_FPU;
    Ornot      = "ornot":        C::LOGIC, A, U::OP_AB, ANY_INT_FPU;
    Eqv        = "eqv":          C::LOGIC, A, U::OP_AB, ANY_INT_FPU;
    Nor        = "nor":          C::LOGIC, A, U::OP_AB, ANY_INT_FPU;
    // Mask, insert or extract bytes
    Maskb      = "maskb":        C::SIMPLE_SHIFT, A, U::OP_AB, F::ANY_INT; // bytes only
    // Add and subtract
    Add        = "add":          C::ADDSUB, A, OP_ABC_CC_C, F::ANY_INT;
    Sub        = "sub":          C::ADDSUB, A, OP_ABC_CC_C, F::ANY_INT;
    Adda       = "adda":         C::ADDSHIFT, A, U::OP_ABC, F::ANY_INT; // ra + rb + (rc << extshift)
    Suba       = "suba":         C::ADDSHIFT, A, U::OP_ABC, F::ANY_INT;
    Addm       = "addm":         C::ADDSUB, A, U::OP_ABC, F::ANY_INT; // lowbits(ra + rb, m)
    Subm       = "subm":         C::ADDSUB, A, U::OP_ABC, F::ANY_INT;
    // Condition code logical ops
    Andcc      = "andcc":        C::FLAGS, A, OP_AB_CC_AB, F::ANY_INT;
    Orcc       = "orcc":         C::FLAGS, A, OP_AB_CC_AB, F::ANY_INT;
    Xorcc      = "xorcc":        C::FLAGS, A, OP_AB_CC_AB, F::ANY_INT;
    Ornotcc    = "ornotcc":      C::FLAGS, A, OP_AB_CC_AB, F::ANY_INT;
    // Condition code movement and merging
    Movccr     = "movccr":       C::FLAGS, A, OP_A_CC_A, F::ANY_INT;
    Movrcc     = "movrcc":       C::FLAGS, A, U::OP_A, F::ANY_INT;
    Collcc     = "collcc":       C::FLAGS, A, OP_ABC_CC_ABC, F::ANY_INT;
    // Simple shifting (immediate restricted to 0..8)
    Shls       = "shls":         C::SIMPLE_SHIFT, A, U::OP_AB, F::ANY_INT;
    Shrs       = "shrs":         C::SIMPLE_SHIFT, A, U::OP_AB, F::ANY_INT;
    Bswap      = "bswap":        C::LOGIC, A, U::OP_AB, F::ANY_INT;
    Sars       = "sars":         C::SIMPLE_SHIFT, A, U::OP_AB, F::ANY_INT;
    // Bit testing
    Bt         = "bt":           C::LOGIC, A, U::OP_AB, F::ANY_ALU;
    Bts        = "bts":          C::LOGIC, A, U::OP_AB, F::ANY_ALU;
    Btr        = "btr":          C::LOGIC, A, U::OP_AB, F::ANY_ALU;
    Btc        = "btc":          C::LOGIC, A, U::OP_AB, F::ANY_ALU;
    // Set and select
    Set        = "set":          C::SELECT, A, OP_ABC_CC_C, F::ANY_INT;
    SetSub     = "set.sub":      C::SELECT, A, U::OP_ABC, F::ANY_INT;
    SetAnd     = "set.and":      C::SELECT, A, U::OP_ABC, F::ANY_INT;
    Sel        = "sel":          C::SELECT, A, OP_ABC_CC_ABC, F::ANY_INT; // rd = falsereg,truereg,condreg
    // Branches
    Br         = "br":           C::COND_BRANCH, A, OP_AB_CC_AB, F::ANY_INT;
    BrSub      = "br.sub":       C::COND_BRANCH, A, U::OP_AB, F::ANY_INT; // compare and branch ("cmp" form)
    BrAnd      = "br.and":       C::COND_BRANCH, A, U::OP_AB, F::ANY_INT; // compare and branch ("test" form)
    Jmp        = "jmp":          C::INDIR_BRANCH, A, U::OP_A, F::ANY_INT; // indirect user branch
    Bru        = "bru":          C::UNCOND_BRANCH, A, U::empty(), F::ANY_INT;
    Jmpp       = "jmpp":         C::INDIR_BRANCH.union(C::BARRIER), A, U::OP_A, ALU_LDU; // simulator-internal indirect
    Brp        = "brp":          C::UNCOND_BRANCH.union(C::BARRIER), A, U::empty(), ALU_LDU; // simulator-internal jump
    // Checks
    Chk        = "chk":          C::CHECK, A, OP_AB_CC_AB, F::ANY_INT; // rollback if condition false; rcimm is exception id
    ChkSub     = "chk.sub":      C::CHECK, A, U::OP_AB, F::ANY_INT;
    ChkAnd     = "chk.and":      C::CHECK, A, U::OP_AB, F::ANY_INT;
    // Loads and stores
    Ld         = "ld":           C::LOAD, L, U::OP_ABC, F::ANY_LDU; // load zero extended
    Ldx        = "ldx":          C::LOAD, L, U::OP_ABC, F::ANY_LDU; // load sign extended
    LdPre      = "ld.pre":       C::PREFETCH, 1, U::OP_AB, F::ANY_LDU;
    St         = "st":           C::STORE, 1, U::OP_ABC, F::ANY_STU;
    // Shifts, rotates and complex masking
    Shl        = "shl":          C::SHIFTROT, A, OP_ABC_CC_C, F::ANY_ALU;
    Shr        = "shr":          C::SHIFTROT, A, OP_ABC_CC_C, F::ANY_ALU;
    Mask       = "mask":         C::SHIFTROT, A, U::OP_AB, F::ANY_ALU; // rd = ra,rb,[ds,ms,mc]
    Sar        = "sar":          C::SHIFTROT, A, OP_ABC_CC_C, F::ANY_ALU;
    Rotl       = "rotl":         C::SHIFTROT, A, OP_ABC_CC_C, F::ANY_ALU;
    Rotr       = "rotr":         C::SHIFTROT, A, OP_ABC_CC_C, F::ANY_ALU;
    Rotcl      = "rotcl":        C::SHIFTROT, A, OP_ABC_CC_C, F::ANY_ALU;
    Rotcr      = "rotcr":        C::SHIFTROT, A, OP_ABC_CC_C, F::ANY_ALU;
    // Multiplication
    Mull       = "mull":         C::MULTIPLY, 4, U::OP_AB, F::ANY_FPU;
    Mulh       = "mulh":         C::MULTIPLY, 4, U::OP_AB, F::ANY_FPU;
    Mulhu      = "mulhu":        C::MULTIPLY, 4, U::OP_AB, F::ANY_FPU;
    // Bit scans
    Ctz        = "ctz":          C::BITSCAN, 3, U::OP_B, F::ANY_FPU;
    Clz        = "clz":          C::BITSCAN, 3, U::OP_B, F::ANY_FPU;
    Ctpop      = "ctpop":        C::BITSCAN, 3, U::OP_B, F::ANY_FPU;
    Permb      = "permb":        C::SHIFTROT, 4, U::OP_ABC, F::ANY_FPU; // byte permute, FP port
    // Floating point
    Addf       = "addf":         C::FP_ALU, 6, U::OP_AB, F::ANY_FPU;
    Subf       = "subf":         C::FP_ALU, 6, U::OP_AB, F::ANY_FPU;
    Mulf       = "mulf":         C::FP_ALU, 6, U::OP_AB, F::ANY_FPU;
    Maddf      = "maddf":        C::FP_ALU, 6, U::OP_ABC, F::ANY_FPU;
    Msubf      = "msubf":        C::FP_ALU, 6, U::OP_ABC, F::ANY_FPU;
    Divf       = "divf":         C::FP_DIVSQRT, 6, U::OP_AB, F::ANY_FPU;
    Sqrtf      = "sqrtf":        C::FP_DIVSQRT, 6, U::OP_AB, F::ANY_FPU;
    Rcpf       = "rcpf":         C::FP_DIVSQRT, 6, U::OP_AB, F::ANY_FPU;
    Rsqrtf     = "rsqrtf":       C::FP_DIVSQRT, 6, U::OP_AB, F::ANY_FPU;
    Minf       = "minf":         C::FP_COMPARE, 4, U::OP_AB, F::ANY_FPU;
    Maxf       = "maxf":         C::FP_COMPARE, 4, U::OP_AB, F::ANY_FPU;
    Cmpf       = "cmpf":         C::FP_COMPARE, 4, U::OP_AB, F::ANY_FPU;
    // size field selects single/double and ordered/unordered compare
    Cmpccf     = "cmpccf":       C::FP_COMPARE, 4, U::OP_AB, F::ANY_FPU;
    Permf      = "permf":        C::FP_PERMUTE, 3, U::OP_AB, F::ANY_FPU; // shuffles
    // Conversions; size field selects IEEE rounding vs truncate-to-zero
    CvtfI2sIns = "cvtf.i2s.ins": C::FP_CVT_I2F, 6, U::OP_AB, F::ANY_FPU;
    CvtfI2sP   = "cvtf.i2s.p":   C::FP_CVT_I2F, 6, U::OP_B, F::ANY_FPU;
    CvtfI2dLo  = "cvtf.i2d.lo":  C::FP_CVT_I2F, 6, U::OP_B, F::ANY_FPU;
    CvtfI2dHi  = "cvtf.i2d.hi":  C::FP_CVT_I2F, 6, U::OP_B, F::ANY_FPU;
    CvtfQ2sIns = "cvtf.q2s.ins": C::FP_CVT_I2F, 6, U::OP_AB, F::ANY_FPU;
    CvtfQ2d    = "cvtf.q2d":     C::FP_CVT_I2F, 6, U::OP_AB, F::ANY_FPU;
    CvtfS2i    = "cvtf.s2i":     C::FP_CVT_F2I, 6, U::OP_B, F::ANY_FPU;
    CvtfS2q    = "cvtf.s2q":     C::FP_CVT_F2I, 6, U::OP_B, F::ANY_FPU;
    CvtfS2iP   = "cvtf.s2i.p":   C::FP_CVT_F2I, 6, U::OP_B, F::ANY_FPU;
    CvtfD2i    = "cvtf.d2i":     C::FP_CVT_F2I, 6, U::OP_B, F::ANY_FPU;
    CvtfD2q    = "cvtf.d2q":     C::FP_CVT_F2I, 6, U::OP_B, F::ANY_FPU;
    CvtfD2iP   = "cvtf.d2i.p":   C::FP_CVT_F2I, 6, U::OP_AB, F::ANY_FPU;
    CvtfD2sIns = "cvtf.d2s.ins": C::FP_CVT_F2F, 6, U::OP_AB, F::ANY_FPU;
    CvtfD2sP   = "cvtf.d2s.p":   C::FP_CVT_F2F, 6, U::OP_AB, F::ANY_FPU;
    CvtfS2dLo  = "cvtf.s2d.lo":  C::FP_CVT_F2F, 6, U::OP_B, F::ANY_FPU;
    CvtfS2dHi  = "cvtf.s2d.hi":  C::FP_CVT_F2F, 6, U::OP_B, F::ANY_FPU;
}

impl Opcode {
    /// Metadata lookup; total over the opcode range by construction.
    pub fn info(self) -> &'static OpcodeInfo {
        &OPCODE_INFO[self as usize]
    }

    /// Decode a raw opcode index (e.g. from a trace file).
    pub fn from_index(index: u8) -> Option<Opcode> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn in_class(self, class: OpClass) -> bool {
        self.info().class.intersects(class)
    }

    pub fn is_load(self) -> bool {
        self.in_class(OpClass::LOAD)
    }

    pub fn is_store(self) -> bool {
        self.in_class(OpClass::STORE)
    }

    pub fn is_branch(self) -> bool {
        self.in_class(OpClass::BRANCH)
    }

    pub fn is_barrier(self) -> bool {
        self.in_class(OpClass::BARRIER)
    }

    /// True if the `cond` field selects one of the 16 condition codes.
    pub fn uses_cond(self) -> bool {
        self.in_class(OpClass::USES_COND)
    }

    /// True if any operand slot feeds the condition-code computation.
    pub fn uses_cc_operands(self) -> bool {
        self.info()
            .usage
            .intersects(OperandUse::CC_RA | OperandUse::CC_RB | OperandUse::CC_RC)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_opcode_has_at_least_one_unit() {
        for op in Opcode::ALL {
            assert!(!op.info().units.is_empty(), "{op} has empty unit mask");
        }
    }

    #[test]
    fn every_opcode_has_exactly_one_primary_class() {
        for op in Opcode::ALL {
            let primary = op.info().class.primary();
            assert_eq!(
                primary.bits().count_ones(),
                1,
                "{op} has ambiguous classification {:?}",
                op.info().class
            );
        }
    }

    #[test]
    fn name_table_is_index_aligned() {
        for op in Opcode::ALL {
            assert_eq!(OPCODE_NAMES[op as usize], op.name());
            assert_eq!(Opcode::from_index(op as u8), Some(op));
        }
        assert_eq!(Opcode::from_index(Opcode::COUNT as u8), None);
    }

    #[test]
    fn br_is_a_conditional_branch_on_integer_units() {
        let info = Opcode::Br.info();
        assert!(Opcode::Br.is_branch());
        assert_eq!(info.class.primary(), OpClass::COND_BRANCH);
        assert!(info.usage.contains(OperandUse::CC_RA | OperandUse::CC_RB));
        assert!(!info.usage.contains(OperandUse::CC_RC));
        assert!(info.units.contains(UnitMask::ANY_ALU));
        assert!(info.units.contains(UnitMask::ANY_LDU));
        assert!(info.units.contains(UnitMask::ANY_STU));
    }

    #[test]
    fn loads_carry_load_latency() {
        assert!(Opcode::Ld.is_load());
        assert!(Opcode::Ldx.is_load());
        assert_eq!(Opcode::Ld.info().latency, LOAD_LATENCY);
        assert_eq!(Opcode::Ldx.info().latency, LOAD_LATENCY);
        // Prefetches complete immediately; they do not produce a value.
        assert_eq!(Opcode::LdPre.info().latency, 1);
        assert_eq!(Opcode::Add.info().latency, ALU_LATENCY);
    }

    #[test]
    fn internal_branches_are_barriers() {
        assert!(Opcode::Jmpp.is_barrier());
        assert!(Opcode::Brp.is_barrier());
        assert!(!Opcode::Bru.is_barrier());
        assert_eq!(Opcode::Jmpp.info().class.primary(), OpClass::INDIR_BRANCH);
        assert_eq!(Opcode::Brp.info().class.primary(), OpClass::UNCOND_BRANCH);
    }

    #[test]
    fn cond_field_interpretation_follows_class() {
        assert!(Opcode::Br.uses_cond());
        assert!(Opcode::Sel.uses_cond());
        assert!(Opcode::Chk.uses_cond());
        assert!(!Opcode::Ld.uses_cond());
        assert!(!Opcode::Mask.uses_cond());
    }

    #[test]
    fn primary_name_matches_class_table() {
        assert_eq!(Opcode::Add.info().class.primary_name(), "addsub");
        assert_eq!(Opcode::Br.info().class.primary_name(), "br.cc");
        assert_eq!(Opcode::Ld.info().class.primary_name(), "ld");
        assert_eq!(Opcode::CvtfS2dHi.info().class.primary_name(), "fp-cvt-f2f");
    }

    #[test]
    fn opcode_count_matches_tables() {
        assert_eq!(Opcode::COUNT, 95);
        assert_eq!(OPCODE_NAMES.len(), Opcode::COUNT);
    }
}
