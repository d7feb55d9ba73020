//! Field constraints enforced before anything is written to the store.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::error::ApiError;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trim and lowercase: emails are compared and stored case-normalized.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_name(name: &str) -> Result<(), ApiError> {
    let len = name.chars().count();
    if !(2..=32).contains(&len) {
        return Err(ApiError::Validation(
            "Name must be 2 to 32 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::Validation(
            "Please fill a valid email address".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    let len = password.chars().count();
    if !(6..=64).contains(&len) {
        return Err(ApiError::Validation(
            "Password must be 6 to 64 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ApiError> {
    let len = description.chars().count();
    if !(1..=300).contains(&len) {
        return Err(ApiError::Validation(
            "Description must be 1 to 300 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_avatar(avatar: &str) -> Result<(), ApiError> {
    if avatar.chars().count() < 4 || Url::parse(avatar).is_err() {
        return Err(ApiError::Validation("Avatar must be a valid URL".into()));
    }
    Ok(())
}
