use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;

pub(crate) const DEFAULT_IMAGE_FILE: &str = "default.jpg";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) confirm_password: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        validate_new_password(&self.password, &self.confirm_password)?;
        Ok(Self {
            username,
            email,
            password: self.password,
            confirm_password: self.confirm_password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let email = normalize_email(&self.email)?;

        if self.password.is_empty() {
            return Err(DomainError::Validation {
                field: "password",
                message: "must not be empty",
            });
        }
        Ok(Self {
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdateAccountRequest {
    pub(crate) username: String,
    pub(crate) email: String,
}

impl UpdateAccountRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            username: normalize_username(&self.username)?,
            email: normalize_email(&self.email)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RequestPasswordResetRequest {
    pub(crate) email: String,
}

impl RequestPasswordResetRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            email: normalize_email(&self.email)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ResetPasswordRequest {
    pub(crate) token: String,
    pub(crate) password: String,
    pub(crate) confirm_password: String,
}

impl ResetPasswordRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let token = self.token.trim();
        if token.is_empty() {
            return Err(DomainError::InvalidResetToken);
        }
        validate_new_password(&self.password, &self.confirm_password)?;
        Ok(Self {
            token: token.to_string(),
            password: self.password,
            confirm_password: self.confirm_password,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) image_file: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn new(
        id: i64,
        username: impl Into<String>,
        email: impl Into<String>,
        image_file: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        let username = normalize_username(&username.into())?;
        let email = normalize_email(&email.into())?;
        let image_file = image_file.into();
        let image_file = if image_file.trim().is_empty() {
            DEFAULT_IMAGE_FILE.to_string()
        } else {
            image_file
        };

        Ok(Self {
            id,
            username,
            email,
            image_file,
            created_at,
        })
    }
}

fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    let len = username.chars().count();
    if !(2..=20).contains(&len) {
        return Err(DomainError::Validation {
            field: "username",
            message: "must be 2..20 chars",
        });
    }
    Ok(username.to_string())
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if email.len() > 120 || !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}

fn validate_new_password(password: &str, confirm_password: &str) -> Result<(), DomainError> {
    let password_len = password.chars().count();
    if !(8..=128).contains(&password_len) {
        return Err(DomainError::Validation {
            field: "password",
            message: "must be 8..128 chars",
        });
    }
    if password != confirm_password {
        return Err(DomainError::Validation {
            field: "confirm_password",
            message: "must match password",
        });
    }
    Ok(())
}
