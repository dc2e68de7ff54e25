//! Simulator-internal exception causes.
//!
//! These are data values carried in-band through execution results (a result
//! slot with the INV flag holds one of these ids instead of data). The
//! retirement logic maps them to architectural fault delivery; this crate
//! only provides the vocabulary.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Exception {
    NoException = 0,
    /// Source operand was already invalid; propagate its exception id.
    Propagate = 1,
    /// Branch mispredicted; rollback to the recovery point.
    BranchMiss = 2,
    Unaligned = 3,
    PageRead = 4,
    PageWrite = 5,
    PageExec = 6,
    Reserved7 = 7,
    Reserved8 = 8,
    Reserved9 = 9,
    Reserved10 = 10,
    /// Speculative load aliased an earlier store.
    LdStAlias = 11,
    CheckFailed = 12,
    SkipBlock = 13,
    CacheLocked = 14,
    /// Load/store fill-request queue full; replay the op.
    LfrqFull = 15,
    Float = 16,
    Timer = 17,
    External = 18,
}

/// Index-aligned exception names, consumed by state dumps and trace parsers.
pub const EXCEPTION_NAMES: [&str; Exception::COUNT] = [
    "NoException",
    "Propagate",
    "BranchMiss",
    "Unaligned",
    "PageRead",
    "PageWrite",
    "PageExec",
    "(reserved)",
    "(reserved)",
    "(reserved)",
    "(reserved)",
    "LdStAlias",
    "CheckFailed",
    "SkipBlock",
    "CacheLocked",
    "LFRQFull",
    "Float",
    "Timer",
    "External",
];

impl Exception {
    pub const COUNT: usize = 19;

    pub fn from_index(index: u64) -> Option<Exception> {
        const ALL: [Exception; Exception::COUNT] = [
            Exception::NoException,
            Exception::Propagate,
            Exception::BranchMiss,
            Exception::Unaligned,
            Exception::PageRead,
            Exception::PageWrite,
            Exception::PageExec,
            Exception::Reserved7,
            Exception::Reserved8,
            Exception::Reserved9,
            Exception::Reserved10,
            Exception::LdStAlias,
            Exception::CheckFailed,
            Exception::SkipBlock,
            Exception::CacheLocked,
            Exception::LfrqFull,
            Exception::Float,
            Exception::Timer,
            Exception::External,
        ];
        usize::try_from(index).ok().and_then(|i| ALL.get(i).copied())
    }

    pub fn name(self) -> &'static str {
        EXCEPTION_NAMES[self as usize]
    }
}

/// Name for a raw exception id, with a placeholder for unknown ids.
pub fn exception_name(index: u64) -> &'static str {
    Exception::from_index(index).map_or("(unknown)", Exception::name)
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_index_aligned() {
        assert_eq!(Exception::NoException.name(), "NoException");
        assert_eq!(Exception::BranchMiss.name(), "BranchMiss");
        assert_eq!(Exception::LdStAlias.name(), "LdStAlias");
        assert_eq!(Exception::External.name(), "External");
        for i in 0..Exception::COUNT as u64 {
            let exc = Exception::from_index(i).unwrap();
            assert_eq!(exc as u64, i);
            assert_eq!(exc.name(), EXCEPTION_NAMES[i as usize]);
        }
    }

    #[test]
    fn unknown_ids_get_a_placeholder() {
        assert_eq!(exception_name(19), "(unknown)");
        assert_eq!(exception_name(u64::MAX), "(unknown)");
        assert_eq!(exception_name(2), "BranchMiss");
    }
}
