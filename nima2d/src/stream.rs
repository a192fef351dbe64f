//! Record streams and the block framer.
//!
//! Both physical encodings implement [`RecordStream`]. Every read carries a label: the
//! JSON form looks values up by that label inside object scopes, the binary form
//! ignores it and consumes bytes in declaration order. Decoders are written once
//! against the trait and therefore produce the same logical result for either input.

use crate::{AtlasSource, Error};
use std::fmt;

/// Raw tag of a framed block before it is mapped into a [`BlockKind`] namespace.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BlockTag {
    Code(u8),
    Name(String),
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "#{code}"),
            Self::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// A tag namespace (file/component blocks, animated property blocks).
pub trait BlockKind: Copy + Sized {
    fn from_code(code: u8) -> Option<Self>;
    fn from_name(name: &str) -> Option<Self>;
}

/// One framed record: its kind (`None` when the tag is unknown) and a stream bounded
/// to the payload. Dropping an unread block skips it.
#[derive(Debug)]
pub struct Block<K, S> {
    pub kind: Option<K>,
    pub tag: BlockTag,
    pub stream: S,
}

pub trait RecordStream: Sized {
    fn is_eof(&self) -> bool;

    fn read_u8(&mut self, label: &str) -> Result<u8, Error>;
    fn read_u16(&mut self, label: &str) -> Result<u16, Error>;
    fn read_u32(&mut self, label: &str) -> Result<u32, Error>;
    fn read_i32(&mut self, label: &str) -> Result<i32, Error>;
    fn read_f32(&mut self, label: &str) -> Result<f32, Error>;
    fn read_f64(&mut self, label: &str) -> Result<f64, Error>;
    fn read_bool(&mut self, label: &str) -> Result<bool, Error>;
    fn read_string(&mut self, label: &str) -> Result<String, Error>;
    fn read_bytes(&mut self, label: &str) -> Result<Vec<u8>, Error>;

    /// Fills `out` completely; the source must hold exactly `out.len()` elements.
    fn read_f32_array(&mut self, out: &mut [f32], label: &str) -> Result<(), Error>;
    fn read_u16_array(&mut self, out: &mut [u16], label: &str) -> Result<(), Error>;

    /// Reads a list of `count` elements whose count came from the file. The source
    /// is checked to hold them all before anything is allocated.
    fn read_f32_vec(&mut self, count: usize, label: &str) -> Result<Vec<f32>, Error>;
    fn read_u16_vec(&mut self, count: usize, label: &str) -> Result<Vec<u16>, Error>;

    /// Component reference, returned verbatim. Resolution happens after decode.
    fn read_id(&mut self, label: &str) -> Result<u16, Error> {
        self.read_u16(label)
    }

    /// Element count of the list that follows (or of the current array scope).
    fn read_u8_length(&mut self) -> Result<usize, Error>;
    fn read_u16_length(&mut self) -> Result<usize, Error>;

    fn read_image(&mut self, out_of_band: bool, label: &str) -> Result<AtlasSource, Error>;

    fn open_array(&mut self, label: &str) -> Result<(), Error>;
    fn close_array(&mut self) -> Result<(), Error>;
    fn open_object(&mut self, label: &str) -> Result<(), Error>;
    fn close_object(&mut self) -> Result<(), Error>;

    /// Consumes one whole record and returns its tag plus a payload-bounded stream.
    fn read_raw_block(&mut self) -> Result<Option<(BlockTag, Self)>, Error>;
}

pub fn read_next_block<K: BlockKind, S: RecordStream>(
    stream: &mut S,
) -> Result<Option<Block<K, S>>, Error> {
    if stream.is_eof() {
        return Ok(None);
    }
    let Some((tag, payload)) = stream.read_raw_block()? else {
        return Ok(None);
    };
    let kind = match &tag {
        BlockTag::Code(code) => K::from_code(*code),
        BlockTag::Name(name) => K::from_name(name),
    };
    Ok(Some(Block {
        kind,
        tag,
        stream: payload,
    }))
}
