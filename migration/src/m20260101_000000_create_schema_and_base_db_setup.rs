use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the platform's schema
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS sevak_platform;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO sevak_platform, public;")
            .await?;

        // Grant the base DB user that executes all platform queries access to the schema
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    GRANT ALL ON SCHEMA sevak_platform TO sevak;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA sevak_platform GRANT ALL ON TABLES TO sevak;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA sevak_platform GRANT ALL ON SEQUENCES TO sevak;
                END $$;
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Revoke default privileges first
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA sevak_platform REVOKE ALL ON SEQUENCES FROM sevak;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA sevak_platform REVOKE ALL ON TABLES FROM sevak;
                    REVOKE ALL ON SCHEMA sevak_platform FROM sevak;
                END $$;
            "#)
            .await?;

        // Drop the schema (CASCADE will remove all objects in it)
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS sevak_platform CASCADE;")
            .await?;

        Ok(())
    }
}
