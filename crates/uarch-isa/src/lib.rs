//! Static ISA tables for the micro-op pipeline model.
//!
//! Everything in this crate is immutable, process-wide data: the micro-op
//! opcode set and its per-opcode metadata, the functional-unit registry, the
//! condition-code resolution table, register/exception/datatype name tables
//! and the x86 flag encodings. All tables are plain `'static` items with no
//! interior mutability, so concurrent readers need no synchronization.
//!
//! The out-of-order engine consults these tables every cycle; nothing here is
//! allowed to allocate or take locks.

pub mod cond;
pub mod datatype;
pub mod exception;
pub mod flags;
pub mod opcode;
pub mod regs;
pub mod unit;

pub use cond::{CondCode, CondFlagRegs, COND_CODE_NAMES};
pub use datatype::{DataType, DATATYPE_NAMES};
pub use exception::{Exception, EXCEPTION_NAMES};
pub use flags::{flag_string, SetFlags, X86Flags, SETFLAG_NAMES, X86_FLAG_NAMES};
pub use opcode::{OpClass, Opcode, OpcodeInfo, OperandUse, ALU_LATENCY, LOAD_LATENCY, OPCODE_NAMES};
pub use regs::{ArchReg, ARCH_REG_COUNT, ARCH_REG_NAMES, TRANS_REG_COUNT};
pub use unit::{FuncUnit, UnitMask};
