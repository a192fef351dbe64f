//! Binary (`.nma`) record stream.
//!
//! The stream is IO-free: it operates on an in-memory byte slice and framed blocks
//! are zero-copy sub-slices of it. All multi-byte values are little-endian.

use crate::stream::{BlockTag, RecordStream};
use crate::{AtlasSource, Error};
use byteorder::{ByteOrder, LittleEndian};

#[derive(Clone, Debug)]
pub struct BinaryStream<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> BinaryStream<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.cursor)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < len {
            return Err(Error::UnexpectedEof {
                offset: self.cursor,
                needed: len,
            });
        }
        let slice = &self.bytes[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(slice)
    }

    fn take_elements(&mut self, count: usize, size: usize, label: &str) -> Result<&'a [u8], Error> {
        let len = count.checked_mul(size).ok_or_else(|| {
            Error::invalid(format!("'{label}' declares {count} elements at offset {}", self.cursor))
        })?;
        self.take(len)
    }

    fn read_len_u32(&mut self) -> Result<usize, Error> {
        Ok(LittleEndian::read_u32(self.take(4)?) as usize)
    }
}

impl RecordStream for BinaryStream<'_> {
    fn is_eof(&self) -> bool {
        self.cursor >= self.bytes.len()
    }

    fn read_u8(&mut self, _label: &str) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self, _label: &str) -> Result<u16, Error> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    fn read_u32(&mut self, _label: &str) -> Result<u32, Error> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    fn read_i32(&mut self, _label: &str) -> Result<i32, Error> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    fn read_f32(&mut self, _label: &str) -> Result<f32, Error> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    fn read_f64(&mut self, _label: &str) -> Result<f64, Error> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }

    fn read_bool(&mut self, _label: &str) -> Result<bool, Error> {
        Ok(self.take(1)?[0] != 0)
    }

    fn read_string(&mut self, label: &str) -> Result<String, Error> {
        let offset = self.position();
        let len = self.read_len_u32()?;
        let bytes = self.take(len)?;
        let s = std::str::from_utf8(bytes).map_err(|e| Error::BinaryParse {
            message: format!("invalid utf-8 in '{label}' at offset {offset}: {e}"),
        })?;
        Ok(s.to_string())
    }

    fn read_bytes(&mut self, _label: &str) -> Result<Vec<u8>, Error> {
        let len = self.read_len_u32()?;
        Ok(self.take(len)?.to_vec())
    }

    fn read_f32_array(&mut self, out: &mut [f32], _label: &str) -> Result<(), Error> {
        let bytes = self.take(out.len() * 4)?;
        LittleEndian::read_f32_into(bytes, out);
        Ok(())
    }

    fn read_u16_array(&mut self, out: &mut [u16], _label: &str) -> Result<(), Error> {
        let bytes = self.take(out.len() * 2)?;
        LittleEndian::read_u16_into(bytes, out);
        Ok(())
    }

    fn read_f32_vec(&mut self, count: usize, label: &str) -> Result<Vec<f32>, Error> {
        let bytes = self.take_elements(count, 4, label)?;
        let mut out = vec![0.0; count];
        LittleEndian::read_f32_into(bytes, &mut out);
        Ok(out)
    }

    fn read_u16_vec(&mut self, count: usize, label: &str) -> Result<Vec<u16>, Error> {
        let bytes = self.take_elements(count, 2, label)?;
        let mut out = vec![0; count];
        LittleEndian::read_u16_into(bytes, &mut out);
        Ok(out)
    }

    fn read_u8_length(&mut self) -> Result<usize, Error> {
        Ok(self.take(1)?[0] as usize)
    }

    fn read_u16_length(&mut self) -> Result<usize, Error> {
        Ok(LittleEndian::read_u16(self.take(2)?) as usize)
    }

    fn read_image(&mut self, out_of_band: bool, label: &str) -> Result<AtlasSource, Error> {
        if out_of_band {
            Ok(AtlasSource::Uri(self.read_string(label)?))
        } else {
            Ok(AtlasSource::Bytes(self.read_bytes(label)?))
        }
    }

    fn open_array(&mut self, _label: &str) -> Result<(), Error> {
        Ok(())
    }

    fn close_array(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn open_object(&mut self, _label: &str) -> Result<(), Error> {
        Ok(())
    }

    fn close_object(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn read_raw_block(&mut self) -> Result<Option<(BlockTag, Self)>, Error> {
        if self.is_eof() {
            return Ok(None);
        }
        let code = self.take(1)?[0];
        let len = self.read_len_u32()?;
        let payload = self.take(len).map_err(|_| Error::BinaryParse {
            message: format!(
                "block #{code} declares {len} payload bytes but only {} remain",
                self.remaining()
            ),
        })?;
        Ok(Some((BlockTag::Code(code), BinaryStream::new(payload))))
    }
}
