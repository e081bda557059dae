//! Core data types shared by the validator, the store, and the HTTP surface.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use time::{OffsetDateTime, macros::format_description};

/// Identifier assigned to a video by the store.
pub type VideoId = i64;

/// Closed vocabulary of video qualities a record may advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// 144p.
    P144,
    /// 240p.
    P240,
    /// 360p.
    P360,
    /// 480p.
    P480,
    /// 720p.
    P720,
    /// 1080p.
    P1080,
    /// 1440p.
    P1440,
    /// 2160p.
    P2160,
}

impl Resolution {
    /// Every accepted tag, ordered from lowest to highest quality.
    pub const ALL: [Resolution; 8] = [
        Resolution::P144,
        Resolution::P240,
        Resolution::P360,
        Resolution::P480,
        Resolution::P720,
        Resolution::P1080,
        Resolution::P1440,
        Resolution::P2160,
    ];

    /// Wire representation of the tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::P144 => "P144",
            Resolution::P240 => "P240",
            Resolution::P360 => "P360",
            Resolution::P480 => "P480",
            Resolution::P720 => "P720",
            Resolution::P1080 => "P1080",
            Resolution::P1440 => "P1440",
            Resolution::P2160 => "P2160",
        }
    }

    /// Look up a tag in the vocabulary; `None` when it is not a member.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|resolution| resolution.as_str() == tag)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted video record as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Store-assigned identifier.
    pub id: VideoId,
    /// Display title, stored exactly as submitted.
    pub title: String,
    /// Author name, stored exactly as submitted.
    pub author: String,
    /// Whether clients may download the video.
    pub can_be_downloaded: bool,
    /// Minimum viewer age, if restricted.
    pub min_age_restriction: Option<u8>,
    /// Creation instant, never changed after the record is stored.
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: OffsetDateTime,
    /// Instant the video becomes public.
    #[serde(serialize_with = "serialize_timestamp")]
    pub publication_date: OffsetDateTime,
    /// Qualities the video is offered in.
    pub available_resolutions: Vec<Resolution>,
}

/// Validated fields for a record that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVideo {
    /// Title of the new record.
    pub title: String,
    /// Author of the new record.
    pub author: String,
    /// Advertised qualities.
    pub available_resolutions: Vec<Resolution>,
    /// Explicit publication date; the store defaults it to one day after creation.
    pub publication_date: Option<OffsetDateTime>,
}

/// Validated replacement values for every mutable field of an existing record.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoUpdate {
    /// New title.
    pub title: String,
    /// New author.
    pub author: String,
    /// New download flag.
    pub can_be_downloaded: bool,
    /// New age restriction.
    pub min_age_restriction: Option<u8>,
    /// New publication date.
    pub publication_date: OffsetDateTime,
    /// New resolution list.
    pub available_resolutions: Vec<Resolution>,
}

/// Raw, unvalidated request body for create and update calls.
///
/// Fields are kept as JSON values so the validator can report wrong types per field instead
/// of rejecting the whole body. Built only from a JSON object; a missing key reads as `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoInput {
    /// Candidate title.
    pub title: Value,
    /// Candidate author.
    pub author: Value,
    /// Candidate download flag.
    pub can_be_downloaded: Value,
    /// Candidate age restriction.
    pub min_age_restriction: Value,
    /// Candidate publication date.
    pub publication_date: Value,
    /// Candidate resolution list.
    pub available_resolutions: Value,
}

impl From<Map<String, Value>> for VideoInput {
    fn from(mut body: Map<String, Value>) -> Self {
        let mut take = |key: &str| body.remove(key).unwrap_or(Value::Null);
        Self {
            title: take("title"),
            author: take("author"),
            can_be_downloaded: take("canBeDownloaded"),
            min_age_restriction: take("minAgeRestriction"),
            publication_date: take("publicationDate"),
            available_resolutions: take("availableResolutions"),
        }
    }
}

/// One violated input rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Human-readable description.
    pub message: String,
    /// Name of the offending field, in wire casing.
    pub field: String,
}

impl FieldError {
    /// Build the canonical `Invalid <field>` entry.
    pub fn invalid(field: &str) -> Self {
        Self {
            message: format!("Invalid {field}"),
            field: field.to_string(),
        }
    }
}

/// Ordered list of every rule a request violated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("{} field(s) failed validation", .errors_messages.len())]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    /// Violations in check order.
    pub errors_messages: Vec<FieldError>,
}

impl ValidationErrors {
    /// Append a violation.
    pub fn push(&mut self, error: FieldError) {
        self.errors_messages.push(error);
    }

    /// Whether no rule was violated.
    pub fn is_empty(&self) -> bool {
        self.errors_messages.is_empty()
    }

    /// Field names in check order.
    pub fn fields(&self) -> Vec<&str> {
        self.errors_messages
            .iter()
            .map(|error| error.field.as_str())
            .collect()
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors_messages: Vec<FieldError>) -> Self {
        Self { errors_messages }
    }
}

/// Errors returned by [`crate::videos::VideoRepository`] implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No record carries the requested id.
    #[error("video {0} not found")]
    NotFound(VideoId),
    /// A clear was requested while the collection held nothing.
    #[error("no videos to delete")]
    Empty,
}

/// Render a timestamp as ISO-8601 UTC with millisecond precision (`2023-07-24T12:54:39.991Z`).
pub fn format_timestamp(value: &OffsetDateTime) -> Result<String, time::error::Format> {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    );
    value.to_offset(time::UtcOffset::UTC).format(&format)
}

fn serialize_timestamp<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let text = format_timestamp(value).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn resolution_lookup_is_exact() {
        assert_eq!(Resolution::from_tag("P1080"), Some(Resolution::P1080));
        assert_eq!(Resolution::from_tag("p1080"), None);
        assert_eq!(Resolution::from_tag("1080p"), None);
        assert_eq!(Resolution::from_tag("P4000"), None);
    }

    #[test]
    fn record_serializes_with_camel_case_and_millisecond_dates() {
        let record = VideoRecord {
            id: 7,
            title: "Title".into(),
            author: "Author".into(),
            can_be_downloaded: false,
            min_age_restriction: None,
            created_at: datetime!(2023-07-24 12:54:39.991 UTC),
            publication_date: datetime!(2023-07-25 12:54:39.991 UTC),
            available_resolutions: vec![Resolution::P144, Resolution::P2160],
        };

        let value = serde_json::to_value(&record).expect("serialize record");
        assert_eq!(
            value,
            json!({
                "id": 7,
                "title": "Title",
                "author": "Author",
                "canBeDownloaded": false,
                "minAgeRestriction": null,
                "createdAt": "2023-07-24T12:54:39.991Z",
                "publicationDate": "2023-07-25T12:54:39.991Z",
                "availableResolutions": ["P144", "P2160"]
            })
        );
    }

    #[test]
    fn timestamps_are_rendered_in_utc() {
        let shifted = datetime!(2024-01-01 02:00:00 +02:00);
        assert_eq!(
            format_timestamp(&shifted).expect("format"),
            "2024-01-01T00:00:00.000Z"
        );
    }

    #[test]
    fn input_reads_camel_case_keys_and_defaults_to_null() {
        let body = json!({ "title": "A", "canBeDownloaded": true, "extra": 1 });
        let Value::Object(map) = body else {
            panic!("object literal");
        };
        let input = VideoInput::from(map);
        assert_eq!(input.title, json!("A"));
        assert_eq!(input.can_be_downloaded, json!(true));
        assert_eq!(input.author, Value::Null);
        assert_eq!(input.available_resolutions, Value::Null);
    }

    #[test]
    fn validation_errors_use_errors_messages_key() {
        let errors = ValidationErrors::from(vec![FieldError::invalid("title")]);
        let value = serde_json::to_value(&errors).expect("serialize errors");
        assert_eq!(
            value,
            json!({ "errorsMessages": [{ "message": "Invalid title", "field": "title" }] })
        );
    }
}
