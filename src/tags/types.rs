use serde::{Deserialize, Serialize};
use std::fmt;
use super::slug::derive_slug;
use super::validation::{validate_title, FieldError};

/// Unsaved form state. The slug is computed from the title on every read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDraft {
    pub title: String,
}

impl TagDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }

    pub fn slug(&self) -> String {
        derive_slug(&self.title)
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        validate_title(&self.title)
    }

    /// Request body for this draft. Newly created tags start with no videos.
    pub fn to_new_tag(&self) -> NewTag {
        NewTag {
            title: self.title.clone(),
            slug: self.slug(),
            amount_of_videos: 0,
        }
    }
}

/// Body of `POST /tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTag {
    pub title: String,
    pub slug: String,
    #[serde(rename = "amountOfVideos")]
    pub amount_of_videos: u64,
}

/// Server-assigned tag identifier. Accepts numeric and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagId(pub String);

impl<'de> Deserialize<'de> for TagId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let value: serde_json::Value = Deserialize::deserialize(deserializer)?;

        match value {
            serde_json::Value::String(s) => Ok(TagId(s)),
            serde_json::Value::Number(n) => Ok(TagId(n.to_string())),
            _ => Err(D::Error::custom("expected string or number for tag id")),
        }
    }
}

impl Serialize for TagId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tag as stored by the tag service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TagId>,
    pub title: String,
    pub slug: String,
    #[serde(rename = "amountOfVideos", default)]
    pub amount_of_videos: u64,
}

impl From<NewTag> for TagRecord {
    fn from(tag: NewTag) -> Self {
        Self {
            id: None,
            title: tag.title,
            slug: tag.slug,
            amount_of_videos: tag.amount_of_videos,
        }
    }
}
