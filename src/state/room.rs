//! Room and identity types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::{TimerSettings, TimerState};
use crate::error::RoomError;

/// Identifier of a room
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random room id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated identity of a participant, kept in canonical string form.
///
/// Clients may send identity keys as JSON strings or integers; both
/// deserialize to the same decimal string so `42` and `"42"` compare equal.
/// Every inbound path goes through [`Identity::parse`], which trims
/// surrounding whitespace and refuses an empty key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Canonicalize an identity key received from a client
    pub fn parse(raw: &str) -> Result<Self, RoomError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RoomError::InvalidRequest("identity must not be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawIdentity {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        let raw = match RawIdentity::deserialize(deserializer)? {
            RawIdentity::Text(text) => text,
            RawIdentity::Unsigned(n) => n.to_string(),
            RawIdentity::Signed(n) => n.to_string(),
        };
        Identity::parse(&raw).map_err(de::Error::custom)
    }
}

/// A shared session with one host and a single timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub host: Identity,
    pub timer_state: TimerState,
    #[serde(default)]
    pub timer_settings: TimerSettings,
    pub created_at: DateTime<Utc>,
    /// Bumped by the store on every successful save
    pub version: u64,
}

impl Room {
    pub fn new(
        id: RoomId,
        name: String,
        host: Identity,
        timer_settings: TimerSettings,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            host,
            timer_state: TimerState::new(&timer_settings),
            timer_settings,
            created_at,
            version: 0,
        }
    }

    pub fn is_host(&self, identity: &Identity) -> bool {
        self.host.as_str() == identity.as_str()
    }
}
