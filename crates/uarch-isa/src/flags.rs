//! x86 flag encodings.
//!
//! Two views of the flags exist in the model. Micro-ops carry a compact
//! 3-bit [`SetFlags`] mask saying which flag groups the op defines (zero,
//! carry, overflow; the zero bit stands for the whole ZAPS group). The
//! architectural state and execution results carry real RFLAGS bit positions
//! as [`X86Flags`], with one simulator-private bit marking a result slot as
//! invalid (the value is an exception id, not data).

use bitflags::bitflags;

bitflags! {
    /// RFLAGS bits, at their architectural positions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct X86Flags: u16 {
        const CF = 1 << 0;
        const PF = 1 << 2;
        const AF = 1 << 4;
        const ZF = 1 << 6;
        const SF = 1 << 7;
        const OF = 1 << 11;
        /// Simulator-private: the associated value is an exception id.
        const INV = 1 << 15;

        /// Zero/auxiliary/parity/sign: always written together by
        /// arithmetic ops, hence tracked as one rename target.
        const ZAPS = Self::ZF.bits() | Self::AF.bits() | Self::PF.bits() | Self::SF.bits();
    }
}

/// Names of the RFLAGS bits by bit position, for state dumps.
pub const X86_FLAG_NAMES: [&str; 32] = [
    "c", "X", "p", "W", "a", "?", "z", "s", "t", "i", "d", "o", "iopl0", "iopl1", "nt", "0",
    "rf", "vm", "ac", "vif", "vip", "id", "22", "23", "24", "25", "26", "27", "28", "29", "30",
    "31",
];

/// Compact "zpsco" rendering of a result's flag bits.
pub fn flag_string(flags: X86Flags) -> String {
    let mut s = String::with_capacity(5);
    if flags.contains(X86Flags::ZF) {
        s.push('z');
    }
    if flags.contains(X86Flags::PF) {
        s.push('p');
    }
    if flags.contains(X86Flags::SF) {
        s.push('s');
    }
    if flags.contains(X86Flags::CF) {
        s.push('c');
    }
    if flags.contains(X86Flags::OF) {
        s.push('o');
    }
    s
}

bitflags! {
    /// Which flag groups a micro-op defines (the `setflags` field domain).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct SetFlags: u8 {
        /// Defines the ZAPS group.
        const ZF = 1 << 0;
        const CF = 1 << 1;
        const OF = 1 << 2;
    }
}

/// Index-aligned names for the [`SetFlags`] bits.
pub const SETFLAG_NAMES: [&str; 3] = ["z", "c", "o"];

impl SetFlags {
    /// Expand to the architectural RFLAGS bits this mask covers.
    ///
    /// The zero bit expands to the whole ZAPS group; carry and overflow map
    /// to their single bits.
    pub fn to_x86_flags(self) -> X86Flags {
        let mut out = X86Flags::empty();
        if self.contains(SetFlags::ZF) {
            out |= X86Flags::ZAPS;
        }
        if self.contains(SetFlags::CF) {
            out |= X86Flags::CF;
        }
        if self.contains(SetFlags::OF) {
            out |= X86Flags::OF;
        }
        out
    }

    /// "zco" subset string for disassembly annotations.
    pub fn annotation(self) -> String {
        let mut s = String::with_capacity(3);
        for (i, name) in SETFLAG_NAMES.iter().enumerate() {
            if self.bits() & (1 << i) != 0 {
                s.push_str(name);
            }
        }
        s
    }
}
