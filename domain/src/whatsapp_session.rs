//! Opening and maintaining the persisted auth state of messaging sessions.

use std::sync::Arc;

use log::info;
use sea_orm::DatabaseConnection;

use auth_state::{init_auth_state, AuthState, Protocol, SessionId};
use entity_api::whatsapp_session::{self, SessionSummary};

use crate::error::Error;
use crate::record_store::DbRecordStore;

/// Opens the auth state of `session_id` against the database.
///
/// Fails only for a blank session id. Missing or unreadable credentials fall back to
/// `P::init_creds()`, exactly as `init_auth_state` does for any backend.
pub async fn load_auth_state<P: Protocol>(
    db: Arc<DatabaseConnection>,
    session_id: &str,
) -> Result<AuthState<DbRecordStore, P>, Error> {
    let session_id = SessionId::new(session_id)?;
    let store = Arc::new(DbRecordStore::new(db));

    Ok(init_auth_state(store, session_id).await)
}

/// Removes every stored record of one session, forcing the next connection to pair anew.
/// Returns the number of records removed.
pub async fn clear_session(db: &DatabaseConnection, session_id: &str) -> Result<u64, Error> {
    let session_id = SessionId::new(session_id)?;

    let removed = whatsapp_session::delete_all_for_session(db, session_id.as_str()).await?;
    info!("[{session_id}] Cleared {removed} stored records");

    Ok(removed)
}

pub async fn list_sessions(db: &DatabaseConnection) -> Result<Vec<SessionSummary>, Error> {
    Ok(whatsapp_session::summarize_sessions(db).await?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
    use auth_state::{KeyCategory, KeyData, KeyUpdate, Value, WriteOutcome};
    use chrono::Utc;
    use entity_api::whatsapp_sessions::Model;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr};
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;

    struct TestProtocol;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct TestCreds {
        registration_id: u32,
    }

    impl Protocol for TestProtocol {
        type Creds = TestCreds;
        type AppStateSyncKey = Value;

        fn init_creds() -> TestCreds {
            TestCreds { registration_id: 1 }
        }

        fn reconstruct_app_state_sync_key(
            value: Value,
        ) -> Result<Self::AppStateSyncKey, auth_state::Error> {
            Ok(value)
        }
    }

    fn creds_row(data: &str) -> Model {
        Model {
            session_id: "tenant-1".to_string(),
            id: "creds".to_string(),
            data: data.to_string(),
            updated_at: Utc::now().into(),
        }
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    #[tokio::test]
    async fn load_auth_state_reads_stored_creds() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![creds_row(r#"{"registrationId":4242}"#)]])
            .into_connection();

        let auth = load_auth_state::<TestProtocol>(Arc::new(db), "tenant-1").await?;

        assert_eq!(auth.state.creds.registration_id, 4242);
        assert_eq!(auth.session_id().as_str(), "tenant-1");
        Ok(())
    }

    #[tokio::test]
    async fn load_auth_state_starts_fresh_when_database_is_down() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors(vec![DbErr::Conn(RuntimeErr::Internal(
                "connection refused".to_string(),
            ))])
            .into_connection();

        let auth = load_auth_state::<TestProtocol>(Arc::new(db), "tenant-1").await?;

        assert_eq!(auth.state.creds, TestProtocol::init_creds());
        Ok(())
    }

    #[tokio::test]
    async fn load_auth_state_rejects_blank_session_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = load_auth_state::<TestProtocol>(Arc::new(db), "").await;

        assert!(matches!(
            result,
            Err(Error {
                error_kind: DomainErrorKind::Internal(InternalErrorKind::InvalidInput),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn save_creds_and_key_batch_go_through_the_database() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .append_exec_results(vec![exec_ok(), exec_ok(), exec_ok()])
            .into_connection();

        let mut auth = load_auth_state::<TestProtocol>(Arc::new(db), "tenant-1").await?;
        auth.state.creds.registration_id = 7;
        assert_eq!(auth.save_creds().await, WriteOutcome::Stored);

        let update: KeyUpdate<Value> = HashMap::from([(
            KeyCategory::PreKey,
            HashMap::from([
                (
                    "1".to_string(),
                    Some(KeyData::Value(Value::from("material"))),
                ),
                ("2".to_string(), None),
            ]),
        )]);
        let report = auth.state.keys.set(update).await;

        assert!(report.all_succeeded());
        assert_eq!(
            report.outcome(KeyCategory::PreKey, "1"),
            Some(WriteOutcome::Stored)
        );
        assert_eq!(
            report.outcome(KeyCategory::PreKey, "2"),
            Some(WriteOutcome::Deleted)
        );
        Ok(())
    }

    #[tokio::test]
    async fn clear_session_returns_rows_removed() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 5,
            }])
            .into_connection();

        let removed = clear_session(&db, "tenant-1").await?;

        assert_eq!(removed, 5);
        Ok(())
    }

    #[tokio::test]
    async fn clear_session_surfaces_database_outage() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors(vec![DbErr::Conn(RuntimeErr::Internal(
                "connection refused".to_string(),
            ))])
            .into_connection();

        let result = clear_session(&db, "tenant-1").await;

        assert_eq!(
            result.unwrap_err().error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Unavailable))
        );
    }
}
