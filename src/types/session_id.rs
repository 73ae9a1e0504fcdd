//! Session identifier type using TypeID format.
//!
//! Format: `session_01h455vb4pex5vsknk084sn02q`

use mti::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A time-sortable identifier for one agent conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(MagicTypeId);

/// Error returned when a string is not a valid session ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidSessionId {
    /// TypeID parsing failed
    Parse(String),
    /// The TypeID had a prefix other than `session`
    WrongPrefix {
        /// The prefix that was found
        actual: String,
    },
}

impl fmt::Display for InvalidSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "invalid session ID: {e}"),
            Self::WrongPrefix { actual } => {
                write!(f, "expected prefix '{}', got '{actual}'", SessionId::PREFIX)
            }
        }
    }
}

impl std::error::Error for InvalidSessionId {}

impl SessionId {
    /// The TypeID prefix for session identifiers.
    pub const PREFIX: &'static str = "session";

    /// Creates a fresh session ID backed by a UUIDv7.
    #[must_use]
    pub fn new() -> Self {
        Self(Self::PREFIX.create_type_id::<V7>())
    }

    /// Parses a session ID, rejecting TypeIDs with any other prefix.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSessionId`] if `s` is not a TypeID or has the wrong prefix.
    pub fn parse(s: &str) -> Result<Self, InvalidSessionId> {
        let id = MagicTypeId::from_str(s).map_err(|e| InvalidSessionId::Parse(e.to_string()))?;

        let prefix = id.prefix().as_str();
        if prefix != Self::PREFIX {
            return Err(InvalidSessionId::WrongPrefix {
                actual: prefix.to_string(),
            });
        }

        Ok(Self(id))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = InvalidSessionId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SessionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
