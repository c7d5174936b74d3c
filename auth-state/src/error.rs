//! Error types for the `auth-state` crate.
//!
//! Follows the same pattern as the other layers: a root Error struct holding an error kind
//! and an optional source for error chaining.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for auth-state crate.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in auth-state.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Codec(CodecErrorKind),
    Store(StoreErrorKind),
    Session(SessionErrorKind),
    Protocol(ProtocolErrorKind),
}

/// Errors from converting values to and from their stored text form.
#[derive(Debug, PartialEq)]
pub enum CodecErrorKind {
    EncodeFailed,
    DecodeFailed,
}

/// Errors from the record store backend.
#[derive(Debug, PartialEq)]
pub enum StoreErrorKind {
    Unavailable,
    Query,
}

/// Errors from session and record identifiers.
#[derive(Debug, PartialEq)]
pub enum SessionErrorKind {
    InvalidSessionId,
    UnknownCategory,
}

/// Errors raised by the protocol engine's adapter hooks.
#[derive(Debug, PartialEq)]
pub enum ProtocolErrorKind {
    ReconstructFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let detail = self
            .source
            .as_ref()
            .map(|source| format!(": {source}"))
            .unwrap_or_default();
        match &self.error_kind {
            ErrorKind::Codec(kind) => write!(f, "Codec error: {:?}{}", kind, detail),
            ErrorKind::Store(kind) => write!(f, "Store error: {:?}{}", kind, detail),
            ErrorKind::Session(kind) => write!(f, "Session error: {:?}{}", kind, detail),
            ErrorKind::Protocol(kind) => write!(f, "Protocol error: {:?}{}", kind, detail),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

/// Helper function to create codec errors.
pub fn codec_error(kind: CodecErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Codec(kind),
    }
}

/// Helper function to create store errors.
pub fn store_error(kind: StoreErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Store(kind),
    }
}

/// Helper function to create session errors.
pub fn session_error(kind: SessionErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Session(kind),
    }
}

/// Helper function to create protocol errors.
pub fn protocol_error(kind: ProtocolErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Protocol(kind),
    }
}
