//! Adapter trait implemented by the messaging protocol engine.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Error;
use crate::value::Value;

/// The protocol-specific types and hooks the credential store depends on.
///
/// The store never interprets credentials or key material itself; these hooks are the only
/// place where protocol typing meets the storage layer.
pub trait Protocol: Send + Sync + 'static {
    /// Long-lived identity and registration state of one session.
    type Creds: Serialize + DeserializeOwned + Send + Sync;

    /// Strongly typed form of an `app-state-sync-key` entry.
    type AppStateSyncKey: Serialize + DeserializeOwned + Send + Sync;

    /// Credentials for a brand-new identity, used when a session has none stored.
    fn init_creds() -> Self::Creds;

    /// Rebuilds the typed app-state-sync key from its generically decoded value.
    fn reconstruct_app_state_sync_key(value: Value) -> Result<Self::AppStateSyncKey, Error>;
}
