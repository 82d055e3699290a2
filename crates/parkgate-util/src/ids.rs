//! Strongly-typed identifiers for parkgated

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Name an agent announces itself with
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentName(String);

impl AgentName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Family a reservation is made for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FamilyName(String);

impl FamilyName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FamilyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FamilyName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a requester's reply channel.
///
/// On the FIFO transport this is the filesystem path of the requester's
/// reply pipe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ChannelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_id_is_a_path() {
        let id = ChannelId::new("/tmp/agent-a.pipe");
        assert_eq!(id.as_path(), Path::new("/tmp/agent-a.pipe"));
        assert_eq!(id.to_string(), "/tmp/agent-a.pipe");
    }

    #[test]
    fn ids_serialize_transparently_as_strings() {
        let agent = AgentName::new("agent-1");
        let json = serde_json::to_string(&agent).unwrap();
        assert_eq!(json, "\"agent-1\"");
    }
}
