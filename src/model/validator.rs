use lazy_static::lazy_static;
use regex::Regex;
use validator::{ValidateUrl, ValidationError};

lazy_static! {
    static ref USERNAME: Regex = Regex::new(r"^[a-zA-Z0-9._-]+$").unwrap();
    static ref TWITTER: Regex = Regex::new(r"^[a-zA-Z0-9_]+$").unwrap();
    static ref INSTAGRAM: Regex = Regex::new(r"^[a-zA-Z0-9._]+$").unwrap();
    static ref GITHUB: Regex = Regex::new(r"^[a-zA-Z0-9-]+$").unwrap();
    static ref SLUG: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn matches(re: &Regex, value: &str, code: &'static str, message: &'static str) -> Result<(), ValidationError> {
    if re.is_match(value) {
        Ok(())
    } else {
        Err(error(code, message))
    }
}

pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    matches(
        &USERNAME,
        value,
        "invalid_username",
        "can only contain letters, numbers, periods, underscores, and hyphens",
    )
}

/// An empty string clears the field, anything else must be a URL.
pub fn validate_url_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_url() {
        Ok(())
    } else {
        Err(error("invalid_url", "must be a valid URL"))
    }
}

/// A full URL, or a path on this host such as `/uploads/public/u1/a.png`.
pub fn validate_photo_url(value: &str) -> Result<(), ValidationError> {
    let is_local_path = value.starts_with('/')
        && !value.starts_with("//")
        && !value.chars().any(char::is_whitespace)
        && !value.split('/').any(|segment| segment == "..");

    if value.is_empty() || is_local_path || value.validate_url() {
        Ok(())
    } else {
        Err(error("invalid_url", "must be a valid URL"))
    }
}

pub fn validate_twitter(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    if value.chars().count() > 15 {
        return Err(error("invalid_twitter", "must be at most 15 characters"));
    }
    matches(&TWITTER, value, "invalid_twitter", "can only contain letters, numbers, and underscores")
}

pub fn validate_instagram(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    if value.chars().count() > 30 {
        return Err(error("invalid_instagram", "must be at most 30 characters"));
    }
    matches(
        &INSTAGRAM,
        value,
        "invalid_instagram",
        "can only contain letters, numbers, periods, and underscores",
    )
}

pub fn validate_github(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    if value.chars().count() > 39 {
        return Err(error("invalid_github", "must be at most 39 characters"));
    }
    matches(&GITHUB, value, "invalid_github", "can only contain letters, numbers, and hyphens")
}

/// Lowercase words joined by single hyphens, e.g. `morning-brew`.
pub fn validate_slug(value: &str) -> Result<(), ValidationError> {
    matches(&SLUG, value, "invalid_slug", "must be lowercase letters and numbers separated by hyphens")
}

/// Turns a display name into a slug, e.g. `"Tech & AI"` -> `"tech-ai"`.
pub fn slugify(value: &str) -> String {
    value
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
