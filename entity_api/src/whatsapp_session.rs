use super::error::Error;
use entity::whatsapp_sessions::{ActiveModel, Column, Entity, Model};
use log::debug;
use sea_orm::{
    entity::prelude::*, sea_query::OnConflict, ActiveValue::Set, DatabaseConnection,
    FromQueryResult, QueryOrder, QuerySelect,
};

/// Per-session overview of stored records.
#[derive(Clone, Debug, PartialEq, FromQueryResult)]
pub struct SessionSummary {
    pub session_id: String,
    pub record_count: i64,
    pub last_updated_at: Option<DateTimeWithTimeZone>,
}

/// Finds one record by its composite key
pub async fn find_by_session_and_id(
    db: &DatabaseConnection,
    session_id: &str,
    id: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find_by_id((session_id.to_owned(), id.to_owned()))
        .one(db)
        .await?)
}

/// Inserts a record, or overwrites `data` and `updated_at` if the key already exists
pub async fn upsert(
    db: &DatabaseConnection,
    session_id: &str,
    id: &str,
    data: String,
    updated_at: DateTimeWithTimeZone,
) -> Result<(), Error> {
    debug!("Upserting whatsapp session record {session_id}/{id}");

    let active_model = ActiveModel {
        session_id: Set(session_id.to_owned()),
        id: Set(id.to_owned()),
        data: Set(data),
        updated_at: Set(updated_at),
    };

    Entity::insert(active_model)
        .on_conflict(
            OnConflict::columns([Column::SessionId, Column::Id])
                .update_columns([Column::Data, Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

/// Deletes one record by its composite key. Deleting a missing record is not an error;
/// the number of rows removed (0 or 1) is returned.
pub async fn delete_by_session_and_id(
    db: &DatabaseConnection,
    session_id: &str,
    id: &str,
) -> Result<u64, Error> {
    debug!("Deleting whatsapp session record {session_id}/{id}");

    let result = Entity::delete_many()
        .filter(Column::SessionId.eq(session_id))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Deletes every record of a session, returning the number of rows removed
pub async fn delete_all_for_session(db: &DatabaseConnection, session_id: &str) -> Result<u64, Error> {
    debug!("Deleting all whatsapp session records for {session_id}");

    let result = Entity::delete_many()
        .filter(Column::SessionId.eq(session_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Lists every session with its record count and most recent update, ordered by session id
pub async fn summarize_sessions(db: &DatabaseConnection) -> Result<Vec<SessionSummary>, Error> {
    Ok(Entity::find()
        .select_only()
        .column(Column::SessionId)
        .column_as(Column::Id.count(), "record_count")
        .column_as(Column::UpdatedAt.max(), "last_updated_at")
        .group_by(Column::SessionId)
        .order_by_asc(Column::SessionId)
        .into_model::<SessionSummary>()
        .all(db)
        .await?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, RuntimeErr, Value};
    use std::collections::BTreeMap;

    fn test_model() -> Model {
        Model {
            session_id: "tenant-1".to_string(),
            id: "creds".to_string(),
            data: r#"{"registrationId":1}"#.to_string(),
            updated_at: chrono::Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn find_by_session_and_id_returns_model_when_found() -> Result<(), Error> {
        let model = test_model();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model.clone()]])
            .into_connection();

        let result = find_by_session_and_id(&db, "tenant-1", "creds").await?;

        assert_eq!(result, Some(model));
        Ok(())
    }

    #[tokio::test]
    async fn find_by_session_and_id_returns_none_when_not_found() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let result = find_by_session_and_id(&db, "tenant-1", "pre-key-8").await?;

        assert!(result.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn find_by_session_and_id_propagates_connection_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors(vec![DbErr::Conn(RuntimeErr::Internal(
                "connection refused".to_string(),
            ))])
            .into_connection();

        let result = find_by_session_and_id(&db, "tenant-1", "creds").await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::DatabaseUnavailable
        );
    }

    #[tokio::test]
    async fn upsert_issues_a_single_insert_on_conflict_update() -> Result<(), Error> {
        let model = test_model();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        upsert(
            &db,
            &model.session_id,
            &model.id,
            model.data.clone(),
            model.updated_at,
        )
        .await?;

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let statement = format!("{:?}", log[0]);
        assert!(statement.contains("ON CONFLICT"));
        assert!(statement.contains("whatsapp_sessions"));
        Ok(())
    }

    #[tokio::test]
    async fn delete_by_session_and_id_of_missing_record_succeeds() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let removed = delete_by_session_and_id(&db, "tenant-1", "session-ghost").await?;

        assert_eq!(removed, 0);
        Ok(())
    }

    #[tokio::test]
    async fn delete_all_for_session_returns_rows_removed() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 12,
            }])
            .into_connection();

        let removed = delete_all_for_session(&db, "tenant-1").await?;

        assert_eq!(removed, 12);
        Ok(())
    }

    #[tokio::test]
    async fn summarize_sessions_maps_grouped_rows() -> Result<(), Error> {
        let now: DateTimeWithTimeZone = chrono::Utc::now().into();
        let row = BTreeMap::from([
            ("session_id", Value::from("tenant-1")),
            ("record_count", Value::from(3_i64)),
            ("last_updated_at", Value::from(now)),
        ]);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![row]])
            .into_connection();

        let summaries = summarize_sessions(&db).await?;

        assert_eq!(
            summaries,
            vec![SessionSummary {
                session_id: "tenant-1".to_string(),
                record_count: 3,
                last_updated_at: Some(now),
            }]
        );
        Ok(())
    }
}
