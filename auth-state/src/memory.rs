//! In-memory record store.
//!
//! Keyed by the flattened [`RecordAddress`], so it exercises the same partition scheme a
//! flat key-value backend would use. Failure injection hooks let tests simulate a backend
//! outage or a single failing record.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use log::trace;

use crate::error::{store_error, Error, StoreErrorKind};
use crate::key::{RecordAddress, RecordId, SessionId};
use crate::store::RecordStore;

/// A stored row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub data: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: DashMap<String, StoredRecord>,
    failing_records: DashSet<RecordId>,
    unavailable: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation on `record_id` fail, in any session.
    pub fn fail_record(&self, record_id: RecordId) {
        self.failing_records.insert(record_id);
    }

    pub fn clear_failures(&self) {
        self.failing_records.clear();
        self.unavailable.store(false, Ordering::SeqCst);
    }

    /// Simulate a backend outage: every operation fails until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Raw row access, bypassing failure injection.
    pub fn raw(&self, session_id: &SessionId, record_id: &RecordId) -> Option<StoredRecord> {
        self.records
            .get(&RecordAddress::new(session_id, record_id).flatten())
            .map(|entry| entry.value().clone())
    }

    /// Write a row verbatim, bypassing the codec. Used to plant corrupt data.
    pub fn insert_raw(&self, session_id: &SessionId, record_id: &RecordId, data: &str) {
        self.records.insert(
            RecordAddress::new(session_id, record_id).flatten(),
            StoredRecord {
                data: data.to_string(),
                updated_at: Utc::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn check_available(&self, record_id: &RecordId) -> Result<(), Error> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(store_error(
                StoreErrorKind::Unavailable,
                "memory store marked unavailable",
            ));
        }
        if self.failing_records.contains(record_id) {
            return Err(store_error(
                StoreErrorKind::Query,
                &format!("injected failure for record {record_id}"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn put(
        &self,
        session_id: &SessionId,
        record_id: &RecordId,
        data: String,
        updated_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        self.check_available(record_id)?;
        trace!("MemoryRecordStore::put {session_id}/{record_id}");
        self.records.insert(
            RecordAddress::new(session_id, record_id).flatten(),
            StoredRecord { data, updated_at },
        );
        Ok(())
    }

    async fn get(
        &self,
        session_id: &SessionId,
        record_id: &RecordId,
    ) -> Result<Option<String>, Error> {
        self.check_available(record_id)?;
        trace!("MemoryRecordStore::get {session_id}/{record_id}");
        Ok(self
            .records
            .get(&RecordAddress::new(session_id, record_id).flatten())
            .map(|entry| entry.data.clone()))
    }

    async fn delete(&self, session_id: &SessionId, record_id: &RecordId) -> Result<(), Error> {
        self.check_available(record_id)?;
        trace!("MemoryRecordStore::delete {session_id}/{record_id}");
        self.records
            .remove(&RecordAddress::new(session_id, record_id).flatten());
        Ok(())
    }
}
