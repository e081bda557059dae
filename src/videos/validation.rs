//! Field validation for create and update requests.
//!
//! Checks run in a fixed order (title, author, minAgeRestriction, canBeDownloaded,
//! publicationDate, availableResolutions) and every violated rule is reported, not just the
//! first one. Create requests only look at title, author and availableResolutions.

use serde_json::Value;
use time::{
    Date, OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};

use super::types::{FieldError, NewVideo, Resolution, ValidationErrors, VideoInput, VideoUpdate};

/// Maximum trimmed length of a title.
pub const TITLE_MAX_LEN: usize = 40;
/// Maximum trimmed length of an author name.
pub const AUTHOR_MAX_LEN: usize = 20;
/// Oldest allowed age restriction.
pub const MAX_AGE_RESTRICTION: i64 = 18;

/// Which request shape is being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// `POST /videos`: title, author and resolutions only; a non-array resolution value is
    /// treated as an empty list.
    Create,
    /// `PUT /videos/:id`: every mutable field.
    Update,
}

/// Report every rule `input` violates, in check order. An empty list means the input is
/// acceptable.
pub fn validate(input: &VideoInput, mode: ValidationMode) -> Vec<FieldError> {
    match mode {
        ValidationMode::Create => validate_create(input).err(),
        ValidationMode::Update => validate_update(input).err(),
    }
    .map(|errors| errors.errors_messages)
    .unwrap_or_default()
}

/// Validate a create request and extract the typed fields.
pub fn validate_create(input: &VideoInput) -> Result<NewVideo, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let title = record(&mut errors, check_text(&input.title, "title", TITLE_MAX_LEN));
    let author = record(&mut errors, check_text(&input.author, "author", AUTHOR_MAX_LEN));
    let available_resolutions = match &input.available_resolutions {
        Value::Array(_) => record(&mut errors, check_resolutions(&input.available_resolutions)),
        _ => Some(Vec::new()),
    };

    match (title, author, available_resolutions) {
        (Some(title), Some(author), Some(available_resolutions)) if errors.is_empty() => {
            Ok(NewVideo {
                title,
                author,
                available_resolutions,
                publication_date: None,
            })
        }
        _ => Err(errors),
    }
}

/// Validate an update request and extract replacement values for every mutable field.
pub fn validate_update(input: &VideoInput) -> Result<VideoUpdate, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let title = record(&mut errors, check_text(&input.title, "title", TITLE_MAX_LEN));
    let author = record(&mut errors, check_text(&input.author, "author", AUTHOR_MAX_LEN));
    let min_age_restriction = record(&mut errors, check_age(&input.min_age_restriction));
    let can_be_downloaded = record(&mut errors, check_flag(&input.can_be_downloaded));
    let publication_date = record(&mut errors, check_date(&input.publication_date));
    let available_resolutions =
        record(&mut errors, check_resolutions(&input.available_resolutions));

    match (
        title,
        author,
        min_age_restriction,
        can_be_downloaded,
        publication_date,
        available_resolutions,
    ) {
        (
            Some(title),
            Some(author),
            Some(min_age_restriction),
            Some(can_be_downloaded),
            Some(publication_date),
            Some(available_resolutions),
        ) if errors.is_empty() => Ok(VideoUpdate {
            title,
            author,
            can_be_downloaded,
            min_age_restriction,
            publication_date,
            available_resolutions,
        }),
        _ => Err(errors),
    }
}

fn record<T>(errors: &mut ValidationErrors, outcome: Result<T, FieldError>) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(error) => {
            errors.push(error);
            None
        }
    }
}

fn check_text(value: &Value, field: &str, max_len: usize) -> Result<String, FieldError> {
    let text = value.as_str().ok_or_else(|| FieldError::invalid(field))?;
    let trimmed_len = text.trim().chars().count();
    if trimmed_len == 0 || trimmed_len > max_len {
        return Err(FieldError::invalid(field));
    }
    Ok(text.to_string())
}

fn check_age(value: &Value) -> Result<Option<u8>, FieldError> {
    if value.is_null() {
        return Ok(None);
    }
    value
        .as_i64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|age| age.fract() == 0.0)
                .map(|age| age as i64)
        })
        .filter(|age| (0..=MAX_AGE_RESTRICTION).contains(age))
        .and_then(|age| u8::try_from(age).ok())
        .map(Some)
        .ok_or_else(|| FieldError::invalid("minAgeRestriction"))
}

fn check_flag(value: &Value) -> Result<bool, FieldError> {
    value
        .as_bool()
        .ok_or_else(|| FieldError::invalid("canBeDownloaded"))
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
fn check_date(value: &Value) -> Result<OffsetDateTime, FieldError> {
    let text = value
        .as_str()
        .ok_or_else(|| FieldError::invalid("publicationDate"))?;
    OffsetDateTime::parse(text, &Rfc3339)
        .map(|date| date.to_offset(UtcOffset::UTC))
        .or_else(|_| {
            Date::parse(text, format_description!("[year]-[month]-[day]"))
                .map(|date| date.midnight().assume_utc())
        })
        .map_err(|_| FieldError::invalid("publicationDate"))
}

fn check_resolutions(value: &Value) -> Result<Vec<Resolution>, FieldError> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        _ => return Err(FieldError::invalid("availableResolutions")),
    };
    items
        .iter()
        .map(|item| item.as_str().and_then(Resolution::from_tag))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| FieldError::invalid("availableResolutions"))
}
