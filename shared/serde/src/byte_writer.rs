use crate::error::SerdeErr;

/// A growable byte buffer with a write cursor at its end.
///
/// Every frame on the wire is built through a `ByteWriter`: a `u16` opcode
/// first (see [`ByteWriter::write_op`]), then the operation-specific body in
/// positional order. Integers are little-endian; strings and raw payloads are
/// `u16` length-prefixed.
///
/// A writer constructed with [`ByteWriter::with_capacity_limit`] refuses any
/// write that would exceed the limit. The write fails with
/// [`SerdeErr::CapacityExceeded`] and the buffer is left untouched, so a
/// partially-built frame is never silently truncated onto the wire.
pub struct ByteWriter {
    buffer: Vec<u8>,
    limit: Option<usize>,
}

impl ByteWriter {
    /// Create a writer that grows as needed
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64),
            limit: None,
        }
    }

    /// Create a writer that will not grow past `limit` bytes
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(limit),
            limit: Some(limit),
        }
    }

    fn ensure(&mut self, additional: usize) -> Result<(), SerdeErr> {
        if let Some(limit) = self.limit {
            if self.buffer.len() + additional > limit {
                return Err(SerdeErr::CapacityExceeded {
                    requested: additional,
                    limit,
                });
            }
        }
        Ok(())
    }

    /// Write the `u16` opcode that heads every frame. Must be the first write.
    pub fn write_op(&mut self, opcode: u16) -> Result<(), SerdeErr> {
        debug_assert!(self.buffer.is_empty(), "opcode must head the frame");
        self.write_u16(opcode)
    }

    pub fn write_byte(&mut self, value: u8) -> Result<(), SerdeErr> {
        self.ensure(1)?;
        self.buffer.push(value);
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<(), SerdeErr> {
        self.write_byte(if value { 1 } else { 0 })
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), SerdeErr> {
        self.write_data(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), SerdeErr> {
        self.write_data(&value.to_le_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), SerdeErr> {
        self.write_data(&value.to_le_bytes())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<(), SerdeErr> {
        self.write_data(&value.to_le_bytes())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<(), SerdeErr> {
        self.write_data(&value.to_le_bytes())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<(), SerdeErr> {
        self.write_data(&value.to_le_bytes())
    }

    /// Write a UTF-8 string with a `u16` length prefix
    pub fn write_string(&mut self, value: &str) -> Result<(), SerdeErr> {
        let bytes = value.as_bytes();
        if bytes.len() > u16::MAX as usize {
            return Err(SerdeErr::PayloadTooLong {
                length: bytes.len(),
            });
        }
        self.ensure(2 + bytes.len())?;
        self.write_u16(bytes.len() as u16)?;
        self.write_data(bytes)
    }

    /// Append raw bytes with no length prefix
    pub fn write_data(&mut self, data: &[u8]) -> Result<(), SerdeErr> {
        self.ensure(data.len())?;
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Reserve `len` zeroed bytes at the cursor and return a mutable view of
    /// them, so a caller can splice an already-serialized sub-payload into
    /// the frame without an intermediate copy.
    pub fn writable_data(&mut self, len: usize) -> Result<&mut [u8], SerdeErr> {
        self.ensure(len)?;
        let start = self.buffer.len();
        self.buffer.resize(start + len, 0);
        Ok(&mut self.buffer[start..])
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn to_bytes(self) -> Box<[u8]> {
        self.buffer.into_boxed_slice()
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}
