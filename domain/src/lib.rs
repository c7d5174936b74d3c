//! Session credential persistence on top of the relational store.
//!
//! `entity_api` query types are re-exported here so binaries only depend on `domain`.
pub use entity_api::whatsapp_session::SessionSummary;
pub use entity_api::whatsapp_sessions;

pub mod error;
pub mod record_store;
pub mod whatsapp_session;

pub use record_store::DbRecordStore;
