use log::{error, info, warn};
use migration::{Migrator, MigratorTrait};
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!(
        "Starting sevak platform [{}] in {} mode",
        config.database_url(),
        config.runtime_env()
    );

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let app_state = service::AppState::new(config, &db);

    if let Err(e) = Migrator::up(app_state.db_conn_ref(), None).await {
        error!("Failed to apply database migrations: {e}");
        std::process::exit(1);
    }
    info!("Database schema is up to date");

    match domain::whatsapp_session::list_sessions(app_state.db_conn_ref()).await {
        Ok(sessions) if sessions.is_empty() => info!("No stored messaging sessions"),
        Ok(sessions) => {
            for session in sessions {
                let last_updated = session
                    .last_updated_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string());
                info!(
                    "Session {}: {} records, last updated {}",
                    session.session_id, session.record_count, last_updated
                );
            }
        }
        Err(e) => warn!("Could not summarize stored sessions: {e}"),
    }
}
