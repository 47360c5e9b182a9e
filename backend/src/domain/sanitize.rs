//! Normalisation of partial update inputs.
//!
//! Edit endpoints accept sparse payloads. A value that is missing, blank,
//! `"0"` or numerically zero means "leave unchanged", strings are trimmed and
//! empty lists are ignored.

use serde_json::json;

use super::Error;

/// Trim `value` and drop it when it carries no information.
///
/// # Examples
/// ```
/// use campus::domain::sanitize::clean_text;
///
/// assert_eq!(clean_text(Some("  hi ".into())), Some("hi".to_owned()));
/// assert_eq!(clean_text(Some(" ".into())), None);
/// assert_eq!(clean_text(Some("0".into())), None);
/// ```
pub fn clean_text(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "0" {
        return None;
    }
    Some(trimmed.to_owned())
}

/// Trim every entry, drop blank ones and ignore the list if nothing remains.
pub fn clean_list(values: Option<Vec<String>>) -> Option<Vec<String>> {
    let cleaned: Vec<String> = values?
        .into_iter()
        .filter_map(|item| {
            let trimmed = item.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        })
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Drop zero numbers.
pub fn clean_number<T>(value: Option<T>) -> Option<T>
where
    T: PartialEq + Default,
{
    value.filter(|number| *number != T::default())
}

/// Field level validation failure for content payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FieldViolation {
    field: &'static str,
    message: String,
}

impl FieldViolation {
    /// Create a violation for `field`.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        self.field
    }
}

impl From<FieldViolation> for Error {
    fn from(value: FieldViolation) -> Self {
        Error::invalid_request(value.message).with_details(json!({
            "field": value.field,
            "code": "invalid_field",
        }))
    }
}

/// Require a trimmed string whose character count lies within `min..=max`.
pub fn bounded_text(
    field: &'static str,
    label: &str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<String, FieldViolation> {
    let trimmed = value.trim();
    let length = trimmed.chars().count();
    if length < min || length > max {
        return Err(FieldViolation::new(field, format!("Your {label} is invalid")));
    }
    Ok(trimmed.to_owned())
}

/// Require a non-blank trimmed string.
pub fn required_text(field: &'static str, label: &str, value: &str) -> Result<String, FieldViolation> {
    bounded_text(field, label, value, 1, usize::MAX)
}

/// Require at most `max` tags, trimming each and discarding blanks.
pub fn tag_list(values: Vec<String>, max: usize) -> Result<Vec<String>, FieldViolation> {
    let tags = clean_list(Some(values)).unwrap_or_default();
    if tags.len() > max {
        return Err(FieldViolation::new(
            "tags",
            format!("The tags field must contain at most {max} entries"),
        ));
    }
    Ok(tags)
}

/// Require between one and `max` non-blank entries, each trimmed.
pub fn required_list(
    field: &'static str,
    label: &str,
    values: Vec<String>,
    max: usize,
) -> Result<Vec<String>, FieldViolation> {
    let items = clean_list(Some(values)).unwrap_or_default();
    if items.is_empty() {
        return Err(FieldViolation::new(field, format!("The {label} must not be empty")));
    }
    if items.len() > max {
        return Err(FieldViolation::new(
            field,
            format!("The {label} must contain at most {max} entries"),
        ));
    }
    Ok(items)
}

/// Split a free-form tag string on commas and hashes.
///
/// # Examples
/// ```
/// use campus::domain::sanitize::split_tags;
///
/// assert_eq!(split_tags("#rust, web#async"), vec!["rust", "web", "async"]);
/// ```
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split([',', '#'])
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Reject negative amounts.
pub fn non_negative(field: &'static str, label: &str, value: i64) -> Result<i64, FieldViolation> {
    if value < 0 {
        return Err(FieldViolation::new(field, format!("Your {label} is invalid")));
    }
    Ok(value)
}
