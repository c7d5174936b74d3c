//! Text codec for stored credential and key records.
//!
//! `encode` produces JSON in which every [`Buffer`](crate::value::Buffer) is written as a
//! tagged marker object, and `decode` restores the exact byte sequences. The output is
//! suitable for a plain text column.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{codec_error, CodecErrorKind, Error};

/// Converts a value into its stored text form.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    serde_json::to_string(value)
        .map_err(|e| codec_error(CodecErrorKind::EncodeFailed, &e.to_string()))
}

/// Restores a value from its stored text form.
///
/// Any text that is not a valid encoding of `T` yields a `DecodeFailed` codec error.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, Error> {
    serde_json::from_str(text).map_err(|e| codec_error(CodecErrorKind::DecodeFailed, &e.to_string()))
}
