//! Random-access byte sources backing a loaded package.
//!
//! A package is read through a [`ByteSource`] so that many concurrent
//! readers can pull entries out of the same archive without sharing a
//! cursor.

mod adapter;
mod byte_source;

pub use adapter::ByteSourceCursor;
pub use byte_source::{ByteSource, FileSource, MemorySource};
