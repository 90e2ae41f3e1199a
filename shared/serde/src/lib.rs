//! # Tether Serde
//! Byte-level serialization primitives shared by every crate that builds or
//! parses tether protocol frames.

mod byte_reader;
mod byte_writer;
mod error;
mod serde;

pub use byte_reader::ByteReader;
pub use byte_writer::ByteWriter;
pub use error::SerdeErr;
pub use serde::Serde;
