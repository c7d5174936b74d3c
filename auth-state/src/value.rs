//! In-memory representation of credential and key material.
//!
//! Key material is mostly plain structured data with raw byte buffers nested at arbitrary
//! depth. [`Value`] models that shape dynamically for category-agnostic key entries, and
//! [`Buffer`] is the binary leaf, usable directly as a field in strongly typed protocol
//! structures.
//!
//! Buffers serialize as the self-describing marker `{"type":"Buffer","data":"<base64>"}`.
//! The array form `{"type":"Buffer","data":[1,2,3]}` is accepted when reading.

use std::collections::BTreeMap;
use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::{codec_error, CodecErrorKind, Error};

/// Value of the `type` member that marks an object as a binary payload.
pub const BUFFER_TAG: &str = "Buffer";

/// A raw byte payload.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Buffer(pub Vec<u8>);

impl Buffer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

// Key material should not end up verbatim in logs.
impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Buffer({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Buffer(bytes)
    }
}

impl From<&[u8]> for Buffer {
    fn from(bytes: &[u8]) -> Self {
        Buffer(bytes.to_vec())
    }
}

#[derive(Serialize)]
struct TaggedBufferRef<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    data: String,
}

#[derive(Deserialize)]
struct TaggedBuffer {
    #[serde(rename = "type")]
    kind: String,
    data: TaggedData,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TaggedData {
    Base64(String),
    Bytes(Vec<u8>),
}

impl TaggedData {
    fn into_bytes(self) -> Result<Vec<u8>, base64::DecodeError> {
        match self {
            TaggedData::Base64(encoded) => BASE64.decode(encoded),
            TaggedData::Bytes(bytes) => Ok(bytes),
        }
    }
}

impl Serialize for Buffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TaggedBufferRef {
            kind: BUFFER_TAG,
            data: BASE64.encode(&self.0),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Buffer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tagged = TaggedBuffer::deserialize(deserializer)?;
        if tagged.kind != BUFFER_TAG {
            return Err(de::Error::custom(format!(
                "expected a {BUFFER_TAG} marker, found type {:?}",
                tagged.kind
            )));
        }
        tagged.data.into_bytes().map(Buffer).map_err(de::Error::custom)
    }
}

/// Dynamically shaped key material.
///
/// An object consisting of exactly `type: "Buffer"` plus a base64 or byte-array `data`
/// member is read back as [`Value::Buffer`], so such an object cannot be stored as a plain
/// `Value::Object`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Buffer(Buffer),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Truthiness as the protocol engine understands it when deciding between storing and
    /// deleting a key: `null`, `false`, zero and the empty string are "no value". Buffers,
    /// arrays and objects always count as a value, even when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(flag) => *flag,
            Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
            Value::String(text) => !text.is_empty(),
            Value::Buffer(_) | Value::Array(_) | Value::Object(_) => true,
        }
    }

    pub fn as_buffer(&self) -> Option<&Buffer> {
        match self {
            Value::Buffer(buffer) => Some(buffer),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Reinterprets this value as a strongly typed structure.
    ///
    /// Buffers nested anywhere in the value are handed to `T` in their marker form, so any
    /// `Buffer` field of `T` receives the original bytes.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let json = serde_json::to_value(self)
            .map_err(|e| codec_error(CodecErrorKind::EncodeFailed, &e.to_string()))?;
        serde_json::from_value(json)
            .map_err(|e| codec_error(CodecErrorKind::DecodeFailed, &e.to_string()))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(flag) => serializer.serialize_bool(*flag),
            Value::Number(number) => number.serialize(serializer),
            Value::String(text) => serializer.serialize_str(text),
            Value::Buffer(buffer) => buffer.serialize(serializer),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Object(map) => serializer.collect_map(map),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

/// Returns the bytes of a buffer marker object, or `None` if the object is an ordinary map.
fn buffer_marker_bytes(map: &serde_json::Map<String, serde_json::Value>) -> Option<Vec<u8>> {
    if map.len() != 2 || map.get("type")?.as_str()? != BUFFER_TAG {
        return None;
    }
    match map.get("data")? {
        serde_json::Value::String(encoded) => BASE64.decode(encoded).ok(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| item.as_u64().and_then(|byte| u8::try_from(byte).ok()))
            .collect(),
        _ => None,
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(flag) => Value::Bool(flag),
            serde_json::Value::Number(number) => Value::Number(number),
            serde_json::Value::String(text) => Value::String(text),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => match buffer_marker_bytes(&map) {
                Some(bytes) => Value::Buffer(Buffer(bytes)),
                None => Value::Object(
                    map.into_iter()
                        .map(|(key, value)| (key, Value::from(value)))
                        .collect(),
                ),
            },
        }
    }
}

impl From<Buffer> for Value {
    fn from(buffer: Buffer) -> Self {
        Value::Buffer(buffer)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Buffer(Buffer(bytes))
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(text)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Number(number.into())
    }
}

impl From<u64> for Value {
    fn from(number: u64) -> Self {
        Value::Number(number.into())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::Object(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
