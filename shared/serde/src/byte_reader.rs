use crate::error::SerdeErr;

/// A read cursor over a supplied input span.
///
/// Mirrors [`crate::ByteWriter`] operation for operation. Reading past the
/// end of the span fails with [`SerdeErr::UnexpectedEnd`] and leaves the
/// cursor where it was; a failed frame is abandoned rather than guessed at,
/// since a misplaced cursor corrupts every later field in the frame.
pub struct ByteReader<'b> {
    buffer: &'b [u8],
    cursor: usize,
}

impl<'b> ByteReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    fn take(&mut self, len: usize) -> Result<&'b [u8], SerdeErr> {
        if self.remaining() < len {
            return Err(SerdeErr::UnexpectedEnd {
                requested: len,
                remaining: self.remaining(),
            });
        }
        let span = &self.buffer[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(span)
    }

    /// Read the `u16` opcode that heads every frame
    pub fn read_op(&mut self) -> Result<u16, SerdeErr> {
        self.read_u16()
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, SerdeErr> {
        Ok(self.read_byte()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16, SerdeErr> {
        let span = self.take(2)?;
        Ok(u16::from_le_bytes([span[0], span[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, SerdeErr> {
        let span = self.take(4)?;
        Ok(u32::from_le_bytes([span[0], span[1], span[2], span[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32, SerdeErr> {
        let span = self.take(4)?;
        Ok(i32::from_le_bytes([span[0], span[1], span[2], span[3]]))
    }

    pub fn read_i64(&mut self) -> Result<i64, SerdeErr> {
        let span = self.take(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(span);
        Ok(i64::from_le_bytes(bytes))
    }

    pub fn read_f32(&mut self) -> Result<f32, SerdeErr> {
        let span = self.take(4)?;
        Ok(f32::from_le_bytes([span[0], span[1], span[2], span[3]]))
    }

    pub fn read_f64(&mut self) -> Result<f64, SerdeErr> {
        let span = self.take(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(span);
        Ok(f64::from_le_bytes(bytes))
    }

    /// Read a UTF-8 string with a `u16` length prefix
    pub fn read_string(&mut self) -> Result<String, SerdeErr> {
        let length = self.read_u16()? as usize;
        let span = self.take(length)?;
        String::from_utf8(span.to_vec()).map_err(|_| SerdeErr::InvalidUtf8 { length })
    }

    /// Read exactly `len` raw bytes
    pub fn read_data(&mut self, len: usize) -> Result<&'b [u8], SerdeErr> {
        self.take(len)
    }
}
