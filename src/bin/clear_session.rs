use log::{error, info};
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    let Some(session_id) = config.session_id().map(str::to_owned) else {
        error!("No session id given, pass --session-id or set SESSION_ID");
        std::process::exit(2);
    };

    info!("Clearing session {session_id} from [{}]...", config.database_url());

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let service_state = service::AppState::new(config, &db);

    match domain::whatsapp_session::clear_session(service_state.db_conn_ref(), &session_id).await
    {
        Ok(0) => info!("Session {session_id} had no stored records"),
        Ok(removed) => info!("Removed {removed} records, session {session_id} will pair again"),
        Err(e) => {
            error!("Failed to clear session {session_id}: {e}");
            std::process::exit(1);
        }
    }
}
