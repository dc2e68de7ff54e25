//! Micro-op instances and cached basic blocks.
//!
//! A translator (out of scope here) decomposes x86 instructions into
//! fixed-format three-operand micro-ops ([`TransOp`]) and packages straight
//! line runs of them into refcounted, cache-resident [`BasicBlock`]s. The
//! out-of-order engine reads micro-ops out of cached blocks, consulting the
//! static tables in `uarch-isa` for latency, unit eligibility and flag
//! dependencies.
//!
//! The encoding is deliberately compact and slot-overloaded: `rb`/`rc` hold
//! either a register id or the immediate sentinel, and the `cond` field means
//! different things per opcode class. All reads must go through the
//! opcode-aware accessors on [`TransOp`]; nothing interprets the raw slots
//! generically.

pub mod block;
pub mod dump;
pub mod render;
pub mod uop;

pub use block::{BasicBlock, BlockAllocError, MAX_UOPS_PER_BB};
pub use dump::{format_value_and_flags, CoreState};
pub use uop::{LdStAlign, MaskControl, MaskExt, OpSize, TransOp};
