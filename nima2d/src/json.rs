//! JSON (`.nmj`) record stream.
//!
//! The document is walked through a stack of scopes borrowed from a parsed
//! [`serde_json::Value`]. Object scopes look values up by label, array scopes hand
//! out their elements in order. A framed block is a single-key object
//! `{ "<blockName>": payload }` inside an array scope.

use crate::stream::{BlockTag, RecordStream};
use crate::{AtlasSource, Error};
use serde_json::{Map, Value};

#[derive(Clone, Debug)]
enum Scope<'a> {
    Object(&'a Map<String, Value>),
    Array { items: &'a [Value], pos: usize },
}

impl<'a> Scope<'a> {
    fn for_value(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Self::Object(map),
            Value::Array(items) => Self::Array {
                items: items.as_slice(),
                pos: 0,
            },
            other => Self::Array {
                items: std::slice::from_ref(other),
                pos: 0,
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct JsonStream<'a> {
    scopes: Vec<Scope<'a>>,
}

fn field_error(label: &str, message: impl Into<String>) -> Error {
    Error::JsonField {
        label: label.to_string(),
        message: message.into(),
    }
}

fn as_f32(item: &Value, label: &str) -> Result<f32, Error> {
    item.as_f64()
        .map(|v| v as f32)
        .ok_or_else(|| field_error(label, "expected a number"))
}

fn as_u16(item: &Value, label: &str) -> Result<u16, Error> {
    item.as_u64()
        .and_then(|v| u16::try_from(v).ok())
        .ok_or_else(|| field_error(label, "expected a u16"))
}

fn bytes_from(items: &[Value], label: &str) -> Result<Vec<u8>, Error> {
    items
        .iter()
        .map(|v| {
            v.as_u64()
                .and_then(|b| u8::try_from(b).ok())
                .ok_or_else(|| field_error(label, "expected byte values"))
        })
        .collect()
}

impl<'a> JsonStream<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self {
            scopes: vec![Scope::for_value(value)],
        }
    }

    fn next_value(&mut self, label: &str) -> Result<&'a Value, Error> {
        match self.scopes.last_mut() {
            Some(Scope::Object(map)) => {
                let map: &'a Map<String, Value> = *map;
                map.get(label)
                    .ok_or_else(|| field_error(label, "missing from object"))
            }
            Some(Scope::Array { items, pos }) => {
                let items: &'a [Value] = *items;
                let value = items
                    .get(*pos)
                    .ok_or_else(|| field_error(label, "array exhausted"))?;
                *pos += 1;
                Ok(value)
            }
            None => Err(Error::UnbalancedScope {
                message: "read outside of any scope".to_string(),
            }),
        }
    }

    fn next_number(&mut self, label: &str) -> Result<f64, Error> {
        self.next_value(label)?
            .as_f64()
            .ok_or_else(|| field_error(label, "expected a number"))
    }

    fn next_unsigned(&mut self, label: &str) -> Result<u64, Error> {
        self.next_value(label)?
            .as_u64()
            .ok_or_else(|| field_error(label, "expected an unsigned integer"))
    }

    fn next_array(&mut self, label: &str) -> Result<&'a [Value], Error> {
        self.next_value(label)?
            .as_array()
            .map(|items| items.as_slice())
            .ok_or_else(|| field_error(label, "expected an array"))
    }

    fn next_sized_array(&mut self, len: usize, label: &str) -> Result<&'a [Value], Error> {
        let items = self.next_array(label)?;
        if items.len() != len {
            return Err(field_error(
                label,
                format!("expected {len} elements, found {}", items.len()),
            ));
        }
        Ok(items)
    }

    fn remaining_in_array(&self) -> Result<usize, Error> {
        match self.scopes.last() {
            Some(Scope::Array { items, pos }) => Ok(items.len().saturating_sub(*pos)),
            _ => Err(Error::UnbalancedScope {
                message: "length read outside of an array scope".to_string(),
            }),
        }
    }

    fn pop_scope(&mut self, want_array: bool) -> Result<(), Error> {
        if self.scopes.len() <= 1 {
            return Err(Error::UnbalancedScope {
                message: "close without a matching open".to_string(),
            });
        }
        match self.scopes.last() {
            Some(Scope::Array { .. }) if want_array => {}
            Some(Scope::Object(_)) if !want_array => {}
            _ => {
                return Err(Error::UnbalancedScope {
                    message: if want_array {
                        "close_array on an object scope".to_string()
                    } else {
                        "close_object on an array scope".to_string()
                    },
                });
            }
        }
        self.scopes.pop();
        Ok(())
    }
}

impl RecordStream for JsonStream<'_> {
    fn is_eof(&self) -> bool {
        match self.scopes.last() {
            Some(Scope::Array { items, pos }) => *pos >= items.len(),
            _ => true,
        }
    }

    fn read_u8(&mut self, label: &str) -> Result<u8, Error> {
        let v = self.next_unsigned(label)?;
        u8::try_from(v).map_err(|_| field_error(label, format!("{v} does not fit in u8")))
    }

    fn read_u16(&mut self, label: &str) -> Result<u16, Error> {
        let v = self.next_unsigned(label)?;
        u16::try_from(v).map_err(|_| field_error(label, format!("{v} does not fit in u16")))
    }

    fn read_u32(&mut self, label: &str) -> Result<u32, Error> {
        let v = self.next_unsigned(label)?;
        u32::try_from(v).map_err(|_| field_error(label, format!("{v} does not fit in u32")))
    }

    fn read_i32(&mut self, label: &str) -> Result<i32, Error> {
        let v = self
            .next_value(label)?
            .as_i64()
            .ok_or_else(|| field_error(label, "expected an integer"))?;
        i32::try_from(v).map_err(|_| field_error(label, format!("{v} does not fit in i32")))
    }

    fn read_f32(&mut self, label: &str) -> Result<f32, Error> {
        Ok(self.next_number(label)? as f32)
    }

    fn read_f64(&mut self, label: &str) -> Result<f64, Error> {
        self.next_number(label)
    }

    fn read_bool(&mut self, label: &str) -> Result<bool, Error> {
        self.next_value(label)?
            .as_bool()
            .ok_or_else(|| field_error(label, "expected a boolean"))
    }

    fn read_string(&mut self, label: &str) -> Result<String, Error> {
        self.next_value(label)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| field_error(label, "expected a string"))
    }

    fn read_bytes(&mut self, label: &str) -> Result<Vec<u8>, Error> {
        let items = self.next_array(label)?;
        bytes_from(items, label)
    }

    fn read_f32_array(&mut self, out: &mut [f32], label: &str) -> Result<(), Error> {
        let items = self.next_sized_array(out.len(), label)?;
        for (dst, item) in out.iter_mut().zip(items) {
            *dst = as_f32(item, label)?;
        }
        Ok(())
    }

    fn read_u16_array(&mut self, out: &mut [u16], label: &str) -> Result<(), Error> {
        let items = self.next_sized_array(out.len(), label)?;
        for (dst, item) in out.iter_mut().zip(items) {
            *dst = as_u16(item, label)?;
        }
        Ok(())
    }

    fn read_f32_vec(&mut self, count: usize, label: &str) -> Result<Vec<f32>, Error> {
        let items = self.next_sized_array(count, label)?;
        items.iter().map(|item| as_f32(item, label)).collect()
    }

    fn read_u16_vec(&mut self, count: usize, label: &str) -> Result<Vec<u16>, Error> {
        let items = self.next_sized_array(count, label)?;
        items.iter().map(|item| as_u16(item, label)).collect()
    }

    fn read_u8_length(&mut self) -> Result<usize, Error> {
        self.remaining_in_array()
    }

    fn read_u16_length(&mut self) -> Result<usize, Error> {
        self.remaining_in_array()
    }

    fn read_image(&mut self, out_of_band: bool, label: &str) -> Result<AtlasSource, Error> {
        match self.next_value(label)? {
            Value::String(uri) => Ok(AtlasSource::Uri(uri.clone())),
            Value::Array(items) if !out_of_band => {
                Ok(AtlasSource::Bytes(bytes_from(items, label)?))
            }
            _ => Err(field_error(label, "expected an image reference")),
        }
    }

    fn open_array(&mut self, label: &str) -> Result<(), Error> {
        let items = self.next_array(label)?;
        self.scopes.push(Scope::Array { items, pos: 0 });
        Ok(())
    }

    fn close_array(&mut self) -> Result<(), Error> {
        self.pop_scope(true)
    }

    fn open_object(&mut self, label: &str) -> Result<(), Error> {
        let map = self
            .next_value(label)?
            .as_object()
            .ok_or_else(|| field_error(label, "expected an object"))?;
        self.scopes.push(Scope::Object(map));
        Ok(())
    }

    fn close_object(&mut self) -> Result<(), Error> {
        self.pop_scope(false)
    }

    fn read_raw_block(&mut self) -> Result<Option<(BlockTag, Self)>, Error> {
        if self.is_eof() {
            return Ok(None);
        }
        let entry = self
            .next_value("block")?
            .as_object()
            .ok_or_else(|| field_error("block", "expected a single-key object"))?;
        let mut fields = entry.iter();
        match (fields.next(), fields.next()) {
            (Some((name, payload)), None) => {
                Ok(Some((BlockTag::Name(name.clone()), JsonStream::new(payload))))
            }
            _ => Err(field_error(
                "block",
                format!("expected exactly one key, found {}", entry.len()),
            )),
        }
    }
}
