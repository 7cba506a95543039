//! Represents a resource and the content map it carries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

/// Reserved content key holding a resource's primary payload reference.
pub const DEFAULT_LOCATION_KEY: &str = "location";

/// A UUID-identified entity with a category and a string-keyed content map.
///
/// Every content key other than the location key names an attachment: a
/// child resource whose id is the key and whose location is the value.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    /// Primary key.
    pub id: Uuid,

    /// Reference to `categories.id`.
    pub category: i64,

    /// Location plus attachment references.
    pub content: ContentMap,
}

impl Resource {
    pub fn new(id: Uuid, category: i64, content: ContentMap) -> Self {
        Self {
            id,
            category,
            content,
        }
    }
}

/// Flat string to string payload of a resource, stored as one JSON value.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct ContentMap(BTreeMap<String, String>);

impl ContentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map holding only the location entry.
    pub fn with_location(location_key: &str, location: impl Into<String>) -> Self {
        let mut map = Self::new();
        map.insert(location_key, location);
        map
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Yield every attachment named by this map, skipping `location_key`.
    ///
    /// Keys are parsed as UUIDs; a malformed key yields an error in place.
    pub fn attachments<'a>(
        &'a self,
        location_key: &'a str,
    ) -> impl Iterator<Item = Result<Attachment, InvalidAttachmentKey>> + 'a {
        self.iter()
            .filter(move |(key, _)| *key != location_key)
            .map(|(key, location)| Attachment::parse(key, location))
    }
}

impl<K, V> FromIterator<(K, V)> for ContentMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A content entry that references a child resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// Id of the child resource (the content key).
    pub id: Uuid,

    /// Payload reference of the child resource (the content value).
    pub location: String,
}

impl Attachment {
    pub fn parse(key: &str, location: &str) -> Result<Self, InvalidAttachmentKey> {
        let id = Uuid::parse_str(key).map_err(|_| InvalidAttachmentKey(key.to_string()))?;
        Ok(Self {
            id,
            location: location.to_string(),
        })
    }

    /// Materialize the child resource stored for this attachment.
    pub fn into_resource(self, category: i64, location_key: &str) -> Resource {
        Resource::new(
            self.id,
            category,
            ContentMap::with_location(location_key, self.location),
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("attachment key `{0}` is not a valid UUID")]
pub struct InvalidAttachmentKey(pub String);
