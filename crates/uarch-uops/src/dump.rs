//! Textual state dumps for debugging.
//!
//! Renders the speculative and committed architectural register files and
//! decoded result flags. The column layout is a debugging aid, not a
//! machine-parseable contract.

use core::fmt;
use uarch_isa::exception::exception_name;
use uarch_isa::{flag_string, ArchReg, X86Flags, ARCH_REG_COUNT, ARCH_REG_NAMES};

/// Speculative and committed architectural register files plus the last
/// exception id, as seen by the retirement logic.
#[derive(Debug, Clone, Copy)]
pub struct CoreState {
    pub specarf: [u64; ARCH_REG_COUNT],
    pub commitarf: [u64; ARCH_REG_COUNT],
    pub exception: u64,
}

impl CoreState {
    pub fn new() -> CoreState {
        CoreState {
            specarf: [0; ARCH_REG_COUNT],
            commitarf: [0; ARCH_REG_COUNT],
            exception: 0,
        }
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}

fn write_arf(f: &mut fmt::Formatter<'_>, arf: &[u64; ARCH_REG_COUNT]) -> fmt::Result {
    const WIDTH: usize = 4;
    for (i, value) in arf.iter().enumerate() {
        write!(f, "  {:<6} {:#018x}", ARCH_REG_NAMES[i], value)?;
        if i % WIDTH == WIDTH - 1 {
            writeln!(f)?;
        }
    }
    Ok(())
}

impl fmt::Display for CoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Speculative ARF:")?;
        write_arf(f, &self.specarf)?;
        writeln!(f, "Committed ARF:")?;
        write_arf(f, &self.commitarf)?;
        // x87 physical slots and their stack ids, derived from fptos. The
        // fptos register counts in bytes, eight per slot.
        let tos = (self.commitarf[ArchReg::FPTOS.0 as usize] >> 3) as i64;
        for i in (0..8i64).rev() {
            writeln!(f, "  fp{}  st({})", i, (i - tos) & 0x7)?;
        }
        writeln!(f, "Exception Flags")?;
        writeln!(
            f,
            "  Last exception: {:#018x} ({})",
            self.exception,
            exception_name(self.exception)
        )
    }
}

/// Render an execution result with its flags, the way issue-queue traces do.
///
/// A result with the INV flag holds an exception id instead of data and is
/// rendered with the decoded exception name.
pub fn format_value_and_flags(value: u64, flags: X86Flags) -> String {
    let value_part = if flags.contains(X86Flags::INV) {
        format!(" < {:<14} >", exception_name(value))
    } else {
        format!(" {value:#018x}")
    };
    format!("{value_part}|{:<5}", flag_string(flags))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_names_every_architectural_register() {
        let mut state = CoreState::new();
        state.specarf[0] = 0x1234;
        state.commitarf[63] = 0; // "zero"
        state.exception = 2;
        let text = state.to_string();
        assert!(text.contains("Speculative ARF:"));
        assert!(text.contains("Committed ARF:"));
        assert!(text.contains("rax"));
        assert!(text.contains("xmmh15"));
        assert!(text.contains("zero"));
        // Translation-time registers are not architectural state.
        assert!(!text.contains("tr0"));
        assert!(text.contains("(BranchMiss)"));
    }

    #[test]
    fn x87_stack_ids_follow_the_top_of_stack() {
        let mut state = CoreState::new();
        // Top of stack at physical slot 2.
        state.commitarf[ArchReg::FPTOS.0 as usize] = 2 << 3;
        let text = state.to_string();
        assert!(text.contains("  fp2  st(0)"));
        assert!(text.contains("  fp7  st(5)"));
        assert!(text.contains("  fp0  st(6)"));
        // Slots print from fp7 down to fp0.
        let fp7 = text.find("fp7  st(").unwrap();
        let fp0 = text.find("fp0  st(").unwrap();
        assert!(fp7 < fp0);
    }

    #[test]
    fn valid_result_renders_value_and_flag_string() {
        let s = format_value_and_flags(0x2a, X86Flags::ZF | X86Flags::CF);
        assert!(s.contains("0x000000000000002a"));
        assert!(s.ends_with("|zc   "));
    }

    #[test]
    fn invalid_result_renders_exception_name() {
        let s = format_value_and_flags(12, X86Flags::INV);
        assert!(s.contains("CheckFailed"));
        assert!(!s.contains("0x"));
    }
}
