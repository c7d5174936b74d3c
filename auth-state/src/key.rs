//! Partition scheme for stored records.
//!
//! Every record lives at a [`RecordAddress`]: the pair of the owning session and the record
//! id within that session. Backends with composite primary keys store the two parts as
//! separate columns. Backends with a single flat key use [`RecordAddress::flatten`], which
//! length-prefixes the session id so two different sessions can never produce the same key,
//! whatever characters their ids contain.

use std::fmt;

use crate::category::KeyCategory;
use crate::error::{session_error, Error, SessionErrorKind};

/// Record id of the primary credentials, one per session.
pub const CREDS_RECORD_ID: &str = "creds";

/// Identifier of one externally owned messaging session (usually a tenant id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Validates and wraps a session identifier. Blank identifiers are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(session_error(
                SessionErrorKind::InvalidSessionId,
                "session id must not be blank",
            ));
        }
        Ok(SessionId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of one record within a session: `creds` or `<category>-<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    pub fn creds() -> Self {
        RecordId(CREDS_RECORD_ID.to_string())
    }

    pub fn key(category: KeyCategory, id: &str) -> Self {
        RecordId(format!("{}-{}", category.as_str(), id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage address of one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordAddress {
    pub session_id: SessionId,
    pub record_id: RecordId,
}

impl RecordAddress {
    pub fn new(session_id: &SessionId, record_id: &RecordId) -> Self {
        Self {
            session_id: session_id.clone(),
            record_id: record_id.clone(),
        }
    }

    /// Single-string form of the address for flat key-value backends.
    pub fn flatten(&self) -> String {
        format!(
            "{}:{}/{}",
            self.session_id.as_str().len(),
            self.session_id,
            self.record_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_session_id_is_rejected() {
        assert!(SessionId::new("").is_err());
        assert!(SessionId::new("   ").is_err());
        assert!(SessionId::new("tenant-1").is_ok());
    }

    #[test]
    fn test_key_record_id_joins_category_and_id() {
        assert_eq!(RecordId::key(KeyCategory::PreKey, "7").as_str(), "pre-key-7");
        assert_eq!(
            RecordId::key(KeyCategory::AppStateSyncKey, "AAAAAEdU").as_str(),
            "app-state-sync-key-AAAAAEdU"
        );
        assert_eq!(RecordId::creds().as_str(), "creds");
    }

    #[test]
    fn test_same_record_in_different_sessions_has_different_addresses() {
        let record = RecordId::creds();
        let a = RecordAddress::new(&SessionId::new("tenant-a").unwrap(), &record);
        let b = RecordAddress::new(&SessionId::new("tenant-b").unwrap(), &record);

        assert_ne!(a, b);
        assert_ne!(a.flatten(), b.flatten());
    }

    #[test]
    fn test_flatten_is_unambiguous_when_ids_contain_the_separator() {
        // Naive "session/record" joining would map both of these to "a/b/c".
        let first = RecordAddress {
            session_id: SessionId::new("a/b").unwrap(),
            record_id: RecordId("c".to_string()),
        };
        let second = RecordAddress {
            session_id: SessionId::new("a").unwrap(),
            record_id: RecordId("b/c".to_string()),
        };

        assert_ne!(first.flatten(), second.flatten());
    }
}
