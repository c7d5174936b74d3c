pub mod whatsapp_sessions;
