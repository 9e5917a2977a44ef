use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Post identifier, a decimal millisecond string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The closed set of moods a post can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Smile,
    Neutral,
    Sad,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Smile, Mood::Neutral, Mood::Sad];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Smile => "smile",
            Mood::Neutral => "neutral",
            Mood::Sad => "sad",
        }
    }

    /// Emoji drawn inside the marker.
    pub fn icon(&self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Smile => "🙂",
            Mood::Neutral => "😐",
            Mood::Sad => "😢",
        }
    }

    /// Marker fill colour as a CSS hex string.
    pub fn color(&self) -> &'static str {
        match self {
            Mood::Happy => "#10B981",
            Mood::Smile => "#3B82F6",
            Mood::Neutral => "#6B7280",
            Mood::Sad => "#EF4444",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::Validation(format!("unknown mood: {s}")))
    }
}

/// Post entity - a mood and a short comment pinned to a coordinate.
///
/// Field names on the wire match the shared document that every client
/// reads and writes (`lat`, `lng`, `timestamp`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    pub mood: Mood,
    pub nickname: String,
    pub comment: String,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "timestamp")]
    pub created_at: i64,
}

impl Post {
    /// Create a post from caller data plus the assigned id and time.
    pub fn new(id: PostId, data: NewPost, created_at: i64) -> Self {
        Self {
            id,
            latitude: data.latitude,
            longitude: data.longitude,
            mood: data.mood,
            nickname: data.nickname,
            comment: data.comment,
            created_at,
        }
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }
}

/// Caller-supplied part of a post; `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub latitude: f64,
    pub longitude: f64,
    pub mood: Mood,
    pub nickname: String,
    pub comment: String,
}

impl NewPost {
    pub fn new(
        latitude: f64,
        longitude: f64,
        mood: Mood,
        nickname: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            mood,
            nickname: nickname.into(),
            comment: comment.into(),
        }
    }

    /// Trim nickname and comment, rejecting either when blank.
    pub fn validate(self) -> Result<Self, DomainError> {
        let nickname = self.nickname.trim().to_string();
        let comment = self.comment.trim().to_string();

        if nickname.is_empty() {
            return Err(DomainError::Validation("nickname must not be empty".into()));
        }
        if comment.is_empty() {
            return Err(DomainError::Validation("comment must not be empty".into()));
        }
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(DomainError::Validation("coordinates must be finite".into()));
        }

        Ok(Self {
            nickname,
            comment,
            ..self
        })
    }
}
