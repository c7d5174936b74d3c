//! Relational `RecordStore` backed by the `whatsapp_sessions` table.
//!
//! Every record is one row addressed by the composite primary key `(session_id, id)`, so
//! sessions never see each other's rows.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::trace;
use sea_orm::DatabaseConnection;

use auth_state::{
    error::{ErrorKind, StoreErrorKind},
    Error, RecordId, RecordStore, SessionId,
};
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use entity_api::whatsapp_session;

/// Database-backed record store shared by every session served from one pool.
#[derive(Clone)]
pub struct DbRecordStore {
    db: Arc<DatabaseConnection>,
}

impl DbRecordStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn store_db_err(err: EntityApiError) -> Error {
    let kind = match err.error_kind {
        EntityApiErrorKind::DatabaseUnavailable => StoreErrorKind::Unavailable,
        _ => StoreErrorKind::Query,
    };
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::Store(kind),
    }
}

#[async_trait]
impl RecordStore for DbRecordStore {
    async fn put(
        &self,
        session_id: &SessionId,
        record_id: &RecordId,
        data: String,
        updated_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        whatsapp_session::upsert(
            &self.db,
            session_id.as_str(),
            record_id.as_str(),
            data,
            updated_at.into(),
        )
        .await
        .map_err(store_db_err)
    }

    async fn get(
        &self,
        session_id: &SessionId,
        record_id: &RecordId,
    ) -> Result<Option<String>, Error> {
        let row = whatsapp_session::find_by_session_and_id(
            &self.db,
            session_id.as_str(),
            record_id.as_str(),
        )
        .await
        .map_err(store_db_err)?;

        if row.is_none() {
            trace!("No whatsapp session row for {session_id}/{record_id}");
        }

        Ok(row.map(|model| model.data))
    }

    async fn delete(&self, session_id: &SessionId, record_id: &RecordId) -> Result<(), Error> {
        whatsapp_session::delete_by_session_and_id(
            &self.db,
            session_id.as_str(),
            record_id.as_str(),
        )
        .await
        .map_err(store_db_err)?;

        Ok(())
    }
}
