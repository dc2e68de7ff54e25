//! Condition codes and their flag-register dependencies.
//!
//! The renamer tracks the zero/auxiliary/parity/sign flags (the ZAPS group)
//! as one rename target and carry/overflow as two more, because x86
//! arithmetic writes ZAPS as a group: the last writer of any one of them is
//! the last writer of all four. Each of the 16 condition codes therefore
//! resolves to at most two flag-register dependencies plus a combine bit.
//!
//! The table below is transcribed from the hardware definition and is ground
//! truth; do not re-derive it from flag semantics.

use crate::regs::ArchReg;
use core::fmt;

/// The 16 x86 condition codes, in instruction-encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum CondCode {
    O = 0,
    No = 1,
    C = 2,
    Nc = 3,
    E = 4,
    Ne = 5,
    Be = 6,
    Nbe = 7,
    S = 8,
    Ns = 9,
    P = 10,
    Np = 11,
    L = 12,
    Nl = 13,
    Le = 14,
    Nle = 15,
}

/// Index-aligned condition-code names.
pub const COND_CODE_NAMES: [&str; 16] = [
    "o", "no", "c", "nc", "e", "ne", "be", "nbe", "s", "ns", "p", "np", "l", "nl", "le", "nle",
];

/// The flag register(s) whose last writer decides a condition code.
///
/// `combine` means the condition depends on a logical combination of both
/// registers (e.g. `be` = carry or zero) rather than a single bit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CondFlagRegs {
    pub combine: bool,
    pub reg0: ArchReg,
    pub reg1: ArchReg,
}

const Z: ArchReg = ArchReg::ZERO;

#[rustfmt::skip]
static COND_CODE_TO_FLAG_REGS: [CondFlagRegs; 16] = [
    CondFlagRegs { combine: false, reg0: Z,           reg1: ArchReg::OF }, // of:               jo
    CondFlagRegs { combine: false, reg0: Z,           reg1: ArchReg::OF }, // !of:              jno
    CondFlagRegs { combine: false, reg0: Z,           reg1: ArchReg::CF }, // cf:               jb jc jnae
    CondFlagRegs { combine: false, reg0: Z,           reg1: ArchReg::CF }, // !cf:              jnb jnc jae
    CondFlagRegs { combine: false, reg0: ArchReg::ZF, reg1: Z           }, // zf:               jz je
    CondFlagRegs { combine: false, reg0: ArchReg::ZF, reg1: Z           }, // !zf:              jnz jne
    CondFlagRegs { combine: true,  reg0: ArchReg::ZF, reg1: ArchReg::CF }, // cf|zf:            jbe jna
    CondFlagRegs { combine: true,  reg0: ArchReg::ZF, reg1: ArchReg::CF }, // !cf & !zf:        jnbe ja
    CondFlagRegs { combine: false, reg0: ArchReg::ZF, reg1: Z           }, // sf:               js
    CondFlagRegs { combine: false, reg0: ArchReg::ZF, reg1: Z           }, // !sf:              jns
    CondFlagRegs { combine: false, reg0: ArchReg::ZF, reg1: Z           }, // pf:               jp jpe
    CondFlagRegs { combine: false, reg0: ArchReg::ZF, reg1: Z           }, // !pf:              jnp jpo
    CondFlagRegs { combine: true,  reg0: ArchReg::ZF, reg1: ArchReg::OF }, // sf != of:         jl jnge
    CondFlagRegs { combine: true,  reg0: ArchReg::ZF, reg1: ArchReg::OF }, // sf == of:         jnl jge
    CondFlagRegs { combine: true,  reg0: ArchReg::ZF, reg1: ArchReg::OF }, // zf | (sf != of):  jle jng
    CondFlagRegs { combine: true,  reg0: ArchReg::ZF, reg1: ArchReg::OF }, // !zf & (sf == of): jnle jg
];

impl CondCode {
    pub const ALL: [CondCode; 16] = [
        CondCode::O,
        CondCode::No,
        CondCode::C,
        CondCode::Nc,
        CondCode::E,
        CondCode::Ne,
        CondCode::Be,
        CondCode::Nbe,
        CondCode::S,
        CondCode::Ns,
        CondCode::P,
        CondCode::Np,
        CondCode::L,
        CondCode::Nl,
        CondCode::Le,
        CondCode::Nle,
    ];

    /// Decode the 4-bit condition field of a branch/select/check micro-op.
    pub fn from_index(index: u8) -> Option<CondCode> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn name(self) -> &'static str {
        COND_CODE_NAMES[self as usize]
    }

    /// The condition with its sense inverted (`e` <-> `ne`, ...).
    pub fn invert(self) -> CondCode {
        Self::ALL[(self as usize) ^ 1]
    }

    /// Which architectural flag register(s) must be tracked as dependencies
    /// for a micro-op testing this condition.
    pub fn flag_regs(self) -> CondFlagRegs {
        COND_CODE_TO_FLAG_REGS[self as usize]
    }
}

impl fmt::Display for CondCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_regs_drawn_from_flag_pseudo_registers_only() {
        let allowed = [ArchReg::ZERO, ArchReg::ZF, ArchReg::CF, ArchReg::OF];
        for cond in CondCode::ALL {
            let regs = cond.flag_regs();
            assert!(allowed.contains(&regs.reg0), "{cond}: bad reg0");
            assert!(allowed.contains(&regs.reg1), "{cond}: bad reg1");
        }
    }

    #[test]
    fn single_bit_tests_reference_at_most_one_register() {
        for cond in CondCode::ALL {
            let regs = cond.flag_regs();
            if !regs.combine {
                let live = usize::from(regs.reg0 != ArchReg::ZERO)
                    + usize::from(regs.reg1 != ArchReg::ZERO);
                assert!(live <= 1, "{cond} combines without combine bit");
            }
        }
    }

    #[test]
    fn paired_conditions_share_dependencies() {
        // cc and !cc always test the same last writer(s).
        for cond in CondCode::ALL {
            assert_eq!(cond.flag_regs(), cond.invert().flag_regs());
            assert_eq!(cond.invert().invert(), cond);
        }
    }

    #[test]
    fn signed_compares_combine_sign_and_overflow() {
        for cond in [CondCode::L, CondCode::Nl, CondCode::Le, CondCode::Nle] {
            let regs = cond.flag_regs();
            assert!(regs.combine);
            // ZAPS trick: the last writer of SF also delivered ZF.
            assert_eq!(regs.reg0, ArchReg::ZF);
            assert_eq!(regs.reg1, ArchReg::OF);
        }
    }

    #[test]
    fn names_are_encoding_ordered() {
        assert_eq!(CondCode::from_index(4), Some(CondCode::E));
        assert_eq!(CondCode::E.name(), "e");
        assert_eq!(CondCode::Nle.name(), "nle");
        assert_eq!(CondCode::from_index(16), None);
    }
}
