#![allow(dead_code)]

use crate::{BINARY_MAGIC, BlockType, PropertyType};
use byteorder::{LittleEndian, WriteBytesExt};

/// Little-endian writer producing binary actor fixtures in memory.
#[derive(Default)]
pub(crate) struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Magic and version word of a binary actor file.
    pub fn actor(version: u32) -> Self {
        let mut w = Self::new();
        w.buf.extend_from_slice(&BINARY_MAGIC);
        w.u32(version);
        w
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.write_u8(v).unwrap();
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.buf.write_u16::<LittleEndian>(v).unwrap();
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.write_u32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.buf.write_i32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.buf.write_f32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn f64(&mut self, v: f64) -> &mut Self {
        self.buf.write_f64::<LittleEndian>(v).unwrap();
        self
    }

    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.u8(u8::from(v))
    }

    pub fn string(&mut self, v: &str) -> &mut Self {
        self.u32(v.len() as u32);
        self.buf.extend_from_slice(v.as_bytes());
        self
    }

    pub fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.u32(v.len() as u32);
        self.buf.extend_from_slice(v);
        self
    }

    pub fn f32s(&mut self, v: &[f32]) -> &mut Self {
        for &x in v {
            self.f32(x);
        }
        self
    }

    pub fn raw(&mut self, v: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(v);
        self
    }

    /// Frames `body` as one block tagged `code`.
    pub fn block_code(&mut self, code: u8, body: impl FnOnce(&mut BinaryWriter)) -> &mut Self {
        let mut inner = BinaryWriter::new();
        body(&mut inner);
        self.u8(code);
        self.u32(inner.buf.len() as u32);
        self.buf.extend_from_slice(&inner.buf);
        self
    }

    pub fn block(&mut self, kind: BlockType, body: impl FnOnce(&mut BinaryWriter)) -> &mut Self {
        self.block_code(kind.code(), body)
    }

    pub fn property(
        &mut self,
        kind: PropertyType,
        body: impl FnOnce(&mut BinaryWriter),
    ) -> &mut Self {
        self.block_code(kind.code(), body)
    }

    /// `name` and `parent` of every component record.
    pub fn header(&mut self, name: &str, parent: u16) -> &mut Self {
        self.string(name).u16(parent)
    }

    /// Node record body for format revisions with the collapse flag.
    pub fn node(
        &mut self,
        name: &str,
        parent: u16,
        translation: [f32; 2],
        rotation: f32,
    ) -> &mut Self {
        self.header(name, parent)
            .f32s(&translation)
            .f32(rotation)
            .f32s(&[1.0, 1.0])
            .f32(1.0)
            .bool(false)
    }

    pub fn bone(
        &mut self,
        name: &str,
        parent: u16,
        translation: [f32; 2],
        rotation: f32,
        length: f32,
    ) -> &mut Self {
        self.node(name, parent, translation, rotation).f32(length)
    }
}

pub(crate) fn assert_approx(a: f32, b: f32, eps: f32, ctx: &str) {
    if (a - b).abs() > eps {
        panic!("{ctx}: expected {b}, got {a} (diff {})", (a - b).abs());
    }
}
