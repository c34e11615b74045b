//! Field rules shared by the input forms.

use super::error::DomainError;

pub(crate) const TITLE_MAX_CHARS: usize = 256;
pub(crate) const SLUG_MAX_CHARS: usize = 128;
pub(crate) const LOCATION_NAME_MAX_CHARS: usize = 256;
pub(crate) const USERNAME_MAX_CHARS: usize = 150;
pub(crate) const PERSON_NAME_MAX_CHARS: usize = 150;

/// Trims `value` and checks it is non-empty and at most `max_chars` long.
pub(crate) fn required_text(
    field: &'static str,
    value: &str,
    max_chars: Option<usize>,
) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::invalid(field, "must not be empty"));
    }
    if let Some(max) = max_chars
        && value.chars().count() > max
    {
        return Err(DomainError::invalid(field, "is too long"));
    }
    Ok(value.to_string())
}

/// Trims `value`; empty is allowed.
pub(crate) fn optional_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<String, DomainError> {
    let value = value.trim();
    if value.chars().count() > max_chars {
        return Err(DomainError::invalid(field, "is too long"));
    }
    Ok(value.to_string())
}

/// Latin letters, digits, hyphen and underscore.
pub(crate) fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Letters, digits and `@.+-_`.
pub(crate) fn is_username(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}
