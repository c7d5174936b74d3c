pub use entity::whatsapp_sessions;

pub mod error;
pub mod whatsapp_session;
