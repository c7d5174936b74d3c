//! Record store trait for persisting session records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::key::{RecordId, SessionId};

/// Trait for storing and retrieving the serialized records of a session.
///
/// Implementations should:
/// - Partition by `(session_id, record_id)` so sessions never observe each other's records
/// - Treat `put` as an idempotent upsert where the last writer wins
/// - Treat `delete` of an absent record as success
/// - Allow concurrent calls for different record ids of the same session
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or overwrite the stored text of one record.
    ///
    /// # Arguments
    ///
    /// * `session_id` - Owning session
    /// * `record_id` - `creds` or `<category>-<id>`
    /// * `data` - Codec output
    /// * `updated_at` - Informational timestamp, not used for conflict resolution
    async fn put(
        &self,
        session_id: &SessionId,
        record_id: &RecordId,
        data: String,
        updated_at: DateTime<Utc>,
    ) -> Result<(), Error>;

    /// Retrieve the stored text of one record.
    ///
    /// # Returns
    ///
    /// `Some(text)` if found, `None` if no such record exists.
    async fn get(&self, session_id: &SessionId, record_id: &RecordId)
        -> Result<Option<String>, Error>;

    /// Delete one record. Deleting a record that does not exist is not an error.
    async fn delete(&self, session_id: &SessionId, record_id: &RecordId) -> Result<(), Error>;
}
