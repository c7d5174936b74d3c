//! Categories of protocol key material.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{session_error, Error, SessionErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyCategory {
    PreKey,
    Session,
    SenderKey,
    SenderKeyMemory,
    AppStateSyncKey,
    AppStateSyncVersion,
    PendingMutation,
    LidMapping,
    DeviceList,
}

impl KeyCategory {
    pub const ALL: [KeyCategory; 9] = [
        KeyCategory::PreKey,
        KeyCategory::Session,
        KeyCategory::SenderKey,
        KeyCategory::SenderKeyMemory,
        KeyCategory::AppStateSyncKey,
        KeyCategory::AppStateSyncVersion,
        KeyCategory::PendingMutation,
        KeyCategory::LidMapping,
        KeyCategory::DeviceList,
    ];

    /// Wire name, used as the prefix of stored record ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyCategory::PreKey => "pre-key",
            KeyCategory::Session => "session",
            KeyCategory::SenderKey => "sender-key",
            KeyCategory::SenderKeyMemory => "sender-key-memory",
            KeyCategory::AppStateSyncKey => "app-state-sync-key",
            KeyCategory::AppStateSyncVersion => "app-state-sync-version",
            KeyCategory::PendingMutation => "pending-mutation",
            KeyCategory::LidMapping => "lid-mapping",
            KeyCategory::DeviceList => "device-list",
        }
    }
}

impl fmt::Display for KeyCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyCategory {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        KeyCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == name)
            .ok_or_else(|| {
                session_error(
                    SessionErrorKind::UnknownCategory,
                    &format!("unknown key category {name:?}"),
                )
            })
    }
}
