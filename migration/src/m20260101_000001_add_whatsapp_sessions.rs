use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Session credential store for the messaging bot.
        // (session_id, id) is the partition key: id is 'creds' or '<category>-<id>'.
        // Row existence = key set; deletion = key unset. No soft-delete.
        let create_table_sql = r#"
            CREATE TABLE IF NOT EXISTS sevak_platform.whatsapp_sessions (
                session_id TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                PRIMARY KEY (session_id, id)
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_table_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared("ALTER TABLE sevak_platform.whatsapp_sessions OWNER TO sevak")
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS sevak_platform.whatsapp_sessions")
            .await?;

        Ok(())
    }
}
