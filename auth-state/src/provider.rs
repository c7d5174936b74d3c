//! Credential state provider.
//!
//! [`init_auth_state`] loads (or lazily creates) the primary credentials of one session and
//! hands back the [`AuthState`] a protocol engine holds for the lifetime of that session.
//!
//! Every operation here is best-effort: a failed read yields "absent" for that key, and a
//! failed write or delete is logged and reported in the [`BatchReport`] without aborting the
//! other members of the batch. Nothing is retried and nothing is rolled back.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use log::{debug, error, info, trace, warn};
use serde::{de::DeserializeOwned, Serialize, Serializer};

use crate::category::KeyCategory;
use crate::codec;
use crate::error::Error;
use crate::key::{RecordId, SessionId};
use crate::protocol::Protocol;
use crate::store::RecordStore;
use crate::value::Value;

/// One key entry as seen by the protocol engine.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyData<K> {
    /// Category-agnostic key material.
    Value(Value),
    /// An `app-state-sync-key` entry after protocol reconstruction.
    AppStateSyncKey(K),
}

impl<K> KeyData<K> {
    /// Whether writing this entry stores it (`true`) or deletes the key (`false`).
    pub fn is_present(&self) -> bool {
        match self {
            KeyData::Value(value) => value.is_truthy(),
            KeyData::AppStateSyncKey(_) => true,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            KeyData::Value(value) => Some(value),
            KeyData::AppStateSyncKey(_) => None,
        }
    }
}

impl<K> From<Value> for KeyData<K> {
    fn from(value: Value) -> Self {
        KeyData::Value(value)
    }
}

impl<K: Serialize> Serialize for KeyData<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            KeyData::Value(value) => value.serialize(serializer),
            KeyData::AppStateSyncKey(key) => key.serialize(serializer),
        }
    }
}

/// A batch of key writes: category → id → new value, where `None` deletes the key.
pub type KeyUpdate<K> = HashMap<KeyCategory, HashMap<String, Option<KeyData<K>>>>;

/// Result of one put-or-delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Stored,
    Deleted,
    Failed,
}

/// Per-record outcomes of one `set` batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: HashMap<RecordId, WriteOutcome>,
}

impl BatchReport {
    pub fn outcome(&self, category: KeyCategory, id: &str) -> Option<WriteOutcome> {
        self.outcomes.get(&RecordId::key(category, id)).copied()
    }

    pub fn failed(&self) -> Vec<&RecordId> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| **outcome == WriteOutcome::Failed)
            .map(|(record_id, _)| record_id)
            .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes
            .values()
            .all(|outcome| *outcome != WriteOutcome::Failed)
    }
}

/// Applies the one protocol-specific reconstruction step keyed on category.
fn adapt_for_category<P: Protocol>(
    category: KeyCategory,
    value: Value,
) -> Result<KeyData<P::AppStateSyncKey>, Error> {
    match category {
        KeyCategory::AppStateSyncKey => {
            P::reconstruct_app_state_sync_key(value).map(KeyData::AppStateSyncKey)
        }
        _ => Ok(KeyData::Value(value)),
    }
}

async fn read_data<S, T>(store: &S, session_id: &SessionId, record_id: &RecordId) -> Option<T>
where
    S: RecordStore + ?Sized,
    T: DeserializeOwned,
{
    let text = match store.get(session_id, record_id).await {
        Ok(Some(text)) => text,
        Ok(None) => {
            trace!("[{session_id}] No stored auth data ({record_id})");
            return None;
        }
        Err(e) => {
            warn!("[{session_id}] Error reading auth data ({record_id}): {e}");
            return None;
        }
    };

    codec::decode(&text)
        .inspect_err(|e| warn!("[{session_id}] Error parsing auth data ({record_id}): {e}"))
        .ok()
}

async fn write_data<S, T>(
    store: &S,
    session_id: &SessionId,
    record_id: &RecordId,
    value: &T,
) -> WriteOutcome
where
    S: RecordStore + ?Sized,
    T: Serialize + ?Sized,
{
    let text = match codec::encode(value) {
        Ok(text) => text,
        Err(e) => {
            error!("[{session_id}] Error encoding auth data ({record_id}): {e}");
            return WriteOutcome::Failed;
        }
    };

    match store.put(session_id, record_id, text, Utc::now()).await {
        Ok(()) => {
            debug!("[{session_id}] Wrote auth data ({record_id})");
            WriteOutcome::Stored
        }
        Err(e) => {
            error!("[{session_id}] Error writing auth data ({record_id}): {e}");
            WriteOutcome::Failed
        }
    }
}

async fn remove_data<S>(store: &S, session_id: &SessionId, record_id: &RecordId) -> WriteOutcome
where
    S: RecordStore + ?Sized,
{
    match store.delete(session_id, record_id).await {
        Ok(()) => {
            debug!("[{session_id}] Deleted auth data ({record_id})");
            WriteOutcome::Deleted
        }
        Err(e) => {
            error!("[{session_id}] Error deleting auth data ({record_id}): {e}");
            WriteOutcome::Failed
        }
    }
}

/// Read/write access to the categorized key entries of one session.
pub struct SignalKeyStore<S: ?Sized, P> {
    store: Arc<S>,
    session_id: SessionId,
    protocol: PhantomData<fn() -> P>,
}

impl<S: ?Sized, P> Clone for SignalKeyStore<S, P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            session_id: self.session_id.clone(),
            protocol: PhantomData,
        }
    }
}

impl<S, P> SignalKeyStore<S, P>
where
    S: RecordStore + ?Sized,
    P: Protocol,
{
    pub fn new(store: Arc<S>, session_id: SessionId) -> Self {
        Self {
            store,
            session_id,
            protocol: PhantomData,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Read the entries `ids` of `category`.
    ///
    /// Every requested id is present in the result. Entries that were never written, failed
    /// to load, or failed to decode map to `None`. Reads run concurrently.
    pub async fn get<T>(
        &self,
        category: KeyCategory,
        ids: &[T],
    ) -> HashMap<String, Option<KeyData<P::AppStateSyncKey>>>
    where
        T: AsRef<str> + Sync,
    {
        let reads = ids.iter().map(|id| async move {
            let id = id.as_ref();
            let record_id = RecordId::key(category, id);
            let value = read_data::<S, Value>(&self.store, &self.session_id, &record_id)
                .await
                .and_then(|value| {
                    adapt_for_category::<P>(category, value)
                        .inspect_err(|e| {
                            warn!(
                                "[{}] Error reconstructing auth data ({record_id}): {e}",
                                self.session_id
                            )
                        })
                        .ok()
                });
            (id.to_string(), value)
        });

        join_all(reads).await.into_iter().collect()
    }

    /// Apply a batch of writes. Present values are stored; `None` and falsy values delete
    /// the key. Every member runs concurrently and independently of the others.
    pub async fn set(&self, update: KeyUpdate<P::AppStateSyncKey>) -> BatchReport {
        let writes = update
            .into_iter()
            .flat_map(|(category, entries)| {
                entries
                    .into_iter()
                    .map(move |(id, value)| (RecordId::key(category, &id), value))
            })
            .map(|(record_id, value)| async move {
                let outcome = match value.filter(KeyData::is_present) {
                    Some(data) => {
                        write_data(&*self.store, &self.session_id, &record_id, &data).await
                    }
                    None => remove_data(&*self.store, &self.session_id, &record_id).await,
                };
                (record_id, outcome)
            });

        let report = BatchReport {
            outcomes: join_all(writes).await.into_iter().collect(),
        };

        if !report.all_succeeded() {
            warn!(
                "[{}] {} of {} key writes failed",
                self.session_id,
                report.failed().len(),
                report.outcomes.len()
            );
        }

        report
    }
}

/// The state handed to the protocol engine.
pub struct AuthenticationState<S: ?Sized, P: Protocol> {
    /// Primary credentials; the engine mutates these in place.
    pub creds: P::Creds,
    pub keys: SignalKeyStore<S, P>,
}

/// Auth state of one session plus the operation persisting its primary credentials.
pub struct AuthState<S: ?Sized, P: Protocol> {
    pub state: AuthenticationState<S, P>,
}

impl<S, P> AuthState<S, P>
where
    S: RecordStore + ?Sized,
    P: Protocol,
{
    pub fn session_id(&self) -> &SessionId {
        self.state.keys.session_id()
    }

    /// Overwrite the stored primary credentials with the current in-memory value.
    pub async fn save_creds(&self) -> WriteOutcome {
        let keys = &self.state.keys;
        write_data(
            &*keys.store,
            &keys.session_id,
            &RecordId::creds(),
            &self.state.creds,
        )
        .await
    }
}

/// Load the auth state of `session_id`.
///
/// If no usable credentials are stored (missing row, backend failure, or undecodable data)
/// the protocol's fresh credentials are used instead. Nothing is written until
/// [`AuthState::save_creds`] is called.
pub async fn init_auth_state<S, P>(store: Arc<S>, session_id: SessionId) -> AuthState<S, P>
where
    S: RecordStore + ?Sized,
    P: Protocol,
{
    let creds = match read_data::<S, P::Creds>(&store, &session_id, &RecordId::creds()).await {
        Some(creds) => {
            info!("[{session_id}] Loaded stored credentials");
            creds
        }
        None => {
            info!("[{session_id}] No usable stored credentials, starting a new identity");
            P::init_creds()
        }
    };

    AuthState {
        state: AuthenticationState {
            creds,
            keys: SignalKeyStore::new(store, session_id),
        },
    }
}
