//! Output serialization and writing.

pub mod writer;

pub use writer::*;
