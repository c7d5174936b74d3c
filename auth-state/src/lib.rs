//! # auth-state
//!
//! Persistent credential state for multi-device messaging sessions:
//! - A lossless text codec for key material containing binary payloads
//! - A partition scheme isolating one session's records from every other session
//! - The `RecordStore` trait that storage backends implement (plus an in-memory backend)
//! - The credential state provider that a protocol engine holds for one connected session
//!
//! ## Architecture
//!
//! This crate has no database dependency. The relational backend lives in the `domain`
//! crate (`DbRecordStore`), which implements [`store::RecordStore`] on top of `entity_api`.
//! The messaging protocol engine plugs in through the [`protocol::Protocol`] trait.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth_state::{init_auth_state, memory::MemoryRecordStore, SessionId};
//!
//! let store = Arc::new(MemoryRecordStore::new());
//! let mut auth = init_auth_state::<_, MyProtocol>(store, SessionId::new("tenant-1")?).await;
//! auth.state.creds.registration_id = 42;
//! auth.save_creds().await;
//! ```

pub mod category;
pub mod codec;
pub mod error;
pub mod key;
pub mod memory;
pub mod protocol;
pub mod provider;
pub mod store;
pub mod value;

// Re-export commonly used types
pub use category::KeyCategory;
pub use error::{Error, ErrorKind};
pub use key::{RecordAddress, RecordId, SessionId};
pub use protocol::Protocol;
pub use provider::{
    init_auth_state, AuthState, AuthenticationState, BatchReport, KeyData, KeyUpdate,
    SignalKeyStore, WriteOutcome,
};
pub use store::RecordStore;
pub use value::{Buffer, Value};
