//! Error types for the `domain` layer.
use auth_state::error::{ErrorKind as AuthStateErrorKind, StoreErrorKind};
use auth_state::Error as AuthStateError;
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors from `entity_api` and `auth-state` are translated into `DomainErrorKind` so the
/// binaries never match on lower-layer error kinds directly. The original error is kept in
/// `source`.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
}

#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    /// A caller supplied an unusable identifier (e.g. a blank session id).
    InvalidInput,
    Other(String),
}

/// Entity errors reduced to what the domain layer cares about.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Unavailable,
    DbTransaction,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::DatabaseUnavailable => EntityErrorKind::Unavailable,
            EntityApiErrorKind::SystemError => EntityErrorKind::DbTransaction,
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

impl From<AuthStateError> for Error {
    fn from(err: AuthStateError) -> Self {
        let internal_kind = match &err.error_kind {
            AuthStateErrorKind::Session(_) => InternalErrorKind::InvalidInput,
            AuthStateErrorKind::Store(StoreErrorKind::Unavailable) => {
                InternalErrorKind::Entity(EntityErrorKind::Unavailable)
            }
            AuthStateErrorKind::Store(StoreErrorKind::Query) => {
                InternalErrorKind::Entity(EntityErrorKind::DbTransaction)
            }
            AuthStateErrorKind::Codec(_) | AuthStateErrorKind::Protocol(_) => {
                InternalErrorKind::Other(err.to_string())
            }
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(internal_kind),
        }
    }
}
