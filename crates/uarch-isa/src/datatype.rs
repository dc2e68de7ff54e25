//! Datatype tags for profiling and tracing.
//!
//! Classifies what kind of value a micro-op produced. Purely advisory; used
//! by datatype-mix profiling and trace output, never by the scheduler.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum DataType {
    Int = 0,
    Float = 1,
    VecFloat = 2,
    Double = 3,
    VecDouble = 4,
    Vec8Bit = 5,
    Vec16Bit = 6,
    Vec32Bit = 7,
    Vec64Bit = 8,
    Vec128Bit = 9,
}

pub const DATATYPE_NAMES: [&str; DataType::COUNT] = [
    "int", "float", "vec-float", "double", "vec-double", "vec-8bit", "vec-16bit", "vec-32bit",
    "vec-64bit", "vec-128bit",
];

impl DataType {
    pub const COUNT: usize = 10;

    pub fn name(self) -> &'static str {
        DATATYPE_NAMES[self as usize]
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
