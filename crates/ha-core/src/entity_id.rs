//! Entity ID type (`domain.object_id`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for invalid entity IDs
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityIdError {
    #[error("entity_id must be of the form 'domain.object_id'")]
    InvalidFormat,

    #[error("invalid domain '{0}'")]
    InvalidDomain(String),

    #[error("invalid object_id '{0}'")]
    InvalidObjectId(String),
}

/// A validated entity ID such as `media_player.living_room_tv`
///
/// Both halves are lowercase ascii alphanumerics and underscores and may
/// not start or end with an underscore. The domain additionally rejects
/// `__`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    domain: String,
    object_id: String,
}

impl EntityId {
    pub fn new(
        domain: impl Into<String>,
        object_id: impl Into<String>,
    ) -> Result<Self, EntityIdError> {
        let domain = domain.into();
        let object_id = object_id.into();

        if !is_slug_part(&domain) || domain.contains("__") {
            return Err(EntityIdError::InvalidDomain(domain));
        }
        if !is_slug_part(&object_id) {
            return Err(EntityIdError::InvalidObjectId(object_id));
        }

        Ok(Self { domain, object_id })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }
}

fn is_slug_part(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (domain, object_id) = s.split_once('.').ok_or(EntityIdError::InvalidFormat)?;
        if object_id.contains('.') {
            return Err(EntityIdError::InvalidFormat);
        }
        Self::new(domain, object_id)
    }
}

impl TryFrom<String> for EntityId {
    type Error = EntityIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> String {
        id.to_string()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.domain, self.object_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_media_player() {
        let id: EntityId = "media_player.frame_tv".parse().unwrap();
        assert_eq!(id.domain(), "media_player");
        assert_eq!(id.object_id(), "frame_tv");
        assert_eq!(id.to_string(), "media_player.frame_tv");
    }

    #[test]
    fn test_rejects_bad_format() {
        assert_eq!(
            "frame_tv".parse::<EntityId>().unwrap_err(),
            EntityIdError::InvalidFormat
        );
        assert_eq!(
            "a.b.c".parse::<EntityId>().unwrap_err(),
            EntityIdError::InvalidFormat
        );
    }

    #[test]
    fn test_rejects_bad_parts() {
        assert!(matches!(
            "Switch.tv".parse::<EntityId>(),
            Err(EntityIdError::InvalidDomain(_))
        ));
        assert!(matches!(
            "my__domain.tv".parse::<EntityId>(),
            Err(EntityIdError::InvalidDomain(_))
        ));
        assert!(matches!(
            "switch._tv".parse::<EntityId>(),
            Err(EntityIdError::InvalidObjectId(_))
        ));
        assert!(matches!(
            "switch.".parse::<EntityId>(),
            Err(EntityIdError::InvalidObjectId(_))
        ));
        // Double underscores are fine in the object id
        assert!("switch.tv__hdmi".parse::<EntityId>().is_ok());
    }

    #[test]
    fn test_serde_as_string() {
        let id = EntityId::new("switch", "frame_hdmi").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"switch.frame_hdmi\"");
        assert!(serde_json::from_str::<EntityId>("\"nope\"").is_err());
    }
}
