use crate::{ByteReader, ByteWriter, SerdeErr};

/// A type that can write itself into an outgoing frame and read itself back
/// out of an incoming one.
///
/// The encoding is positional: there is no per-field tag on the wire, so the
/// reader must walk fields in exactly the order the writer emitted them.
pub trait Serde: Sized {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr>;
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;
}

impl Serde for u8 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_byte(*self)
    }
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_byte()
    }
}

impl Serde for bool {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_bool(*self)
    }
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_bool()
    }
}

impl Serde for u16 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_u16(*self)
    }
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_u16()
    }
}

impl Serde for u32 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_u32(*self)
    }
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_u32()
    }
}

impl Serde for i32 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_i32(*self)
    }
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_i32()
    }
}

impl Serde for i64 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_i64(*self)
    }
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_i64()
    }
}

impl Serde for f32 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_f32(*self)
    }
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_f32()
    }
}

impl Serde for f64 {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_f64(*self)
    }
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_f64()
    }
}

impl Serde for String {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        writer.write_string(self)
    }
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_string()
    }
}

/// `u16` length-prefixed raw bytes
impl Serde for Vec<u8> {
    fn ser(&self, writer: &mut ByteWriter) -> Result<(), SerdeErr> {
        if self.len() > u16::MAX as usize {
            return Err(SerdeErr::PayloadTooLong { length: self.len() });
        }
        writer.write_u16(self.len() as u16)?;
        writer.write_data(self)
    }
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = reader.read_u16()? as usize;
        Ok(reader.read_data(length)?.to_vec())
    }
}
