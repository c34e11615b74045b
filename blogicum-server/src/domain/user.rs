use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;
use super::rules::{
    PERSON_NAME_MAX_CHARS, USERNAME_MAX_CHARS, is_username, optional_text, required_text,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        let password_len = self.password.chars().count();
        if !(8..=128).contains(&password_len) {
            return Err(DomainError::invalid("password", "must be 8..128 chars"));
        }
        Ok(Self {
            username,
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = required_text("username", &self.username, Some(USERNAME_MAX_CHARS))?;
        if self.password.is_empty() {
            return Err(DomainError::invalid("password", "must not be empty"));
        }
        Ok(Self {
            username,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) is_staff: bool,
    pub(crate) created_at: DateTime<Utc>,
}

/// The only user fields a user may change about themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ProfileForm {
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) username: String,
    pub(crate) email: String,
}

impl ProfileForm {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            first_name: optional_text("first_name", &self.first_name, PERSON_NAME_MAX_CHARS)?,
            last_name: optional_text("last_name", &self.last_name, PERSON_NAME_MAX_CHARS)?,
            username: normalize_username(&self.username)?,
            email: normalize_email(&self.email)?,
        })
    }
}

fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = required_text("username", username, Some(USERNAME_MAX_CHARS))?;
    if !is_username(&username) {
        return Err(DomainError::invalid(
            "username",
            "only letters, digits and @/./+/-/_ are allowed",
        ));
    }
    Ok(username)
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::invalid("email", "must be a valid email"));
    }
    Ok(email)
}
