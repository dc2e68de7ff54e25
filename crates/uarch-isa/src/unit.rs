//! Functional-unit registry.
//!
//! The simulated core has a fixed set of eight execution ports: two load
//! units, two store units, two integer ALUs and two FP/vector units. Opcode
//! metadata refers to them only through [`UnitMask`] eligibility bitmasks;
//! the scheduler picks any available unit within the mask.

use bitflags::bitflags;
use core::fmt;

/// One execution port. The discriminant is the bit position in [`UnitMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FuncUnit {
    Ldu0 = 0,
    Stu0 = 1,
    Ldu1 = 2,
    Stu1 = 3,
    Alu0 = 4,
    Fpu0 = 5,
    Alu1 = 6,
    Fpu1 = 7,
}

impl FuncUnit {
    pub const COUNT: usize = 8;

    pub const ALL: [FuncUnit; Self::COUNT] = [
        FuncUnit::Ldu0,
        FuncUnit::Stu0,
        FuncUnit::Ldu1,
        FuncUnit::Stu1,
        FuncUnit::Alu0,
        FuncUnit::Fpu0,
        FuncUnit::Alu1,
        FuncUnit::Fpu1,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FuncUnit::Ldu0 => "ldu0",
            FuncUnit::Stu0 => "stu0",
            FuncUnit::Ldu1 => "ldu1",
            FuncUnit::Stu1 => "stu1",
            FuncUnit::Alu0 => "alu0",
            FuncUnit::Fpu0 => "fpu0",
            FuncUnit::Alu1 => "alu1",
            FuncUnit::Fpu1 => "fpu1",
        }
    }

    pub fn mask(self) -> UnitMask {
        UnitMask::from_bits_retain(1 << (self as u8))
    }
}

impl fmt::Display for FuncUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Eligibility bitmask over the fixed functional-unit set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct UnitMask: u8 {
        const LDU0 = 1 << 0;
        const STU0 = 1 << 1;
        const LDU1 = 1 << 2;
        const STU1 = 1 << 3;
        const ALU0 = 1 << 4;
        const FPU0 = 1 << 5;
        const ALU1 = 1 << 6;
        const FPU1 = 1 << 7;

        const ANY_LDU = Self::LDU0.bits() | Self::LDU1.bits();
        const ANY_STU = Self::STU0.bits() | Self::STU1.bits();
        const ANY_ALU = Self::ALU0.bits() | Self::ALU1.bits();
        const ANY_FPU = Self::FPU0.bits() | Self::FPU1.bits();
        const ANY_INT = Self::ANY_ALU.bits() | Self::ANY_LDU.bits() | Self::ANY_STU.bits();
    }
}

impl UnitMask {
    pub fn allows(self, unit: FuncUnit) -> bool {
        self.contains(unit.mask())
    }

    /// Units in this mask, in port order.
    pub fn units(self) -> impl Iterator<Item = FuncUnit> {
        FuncUnit::ALL.into_iter().filter(move |u| self.allows(*u))
    }
}
