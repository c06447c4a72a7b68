use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;

pub(crate) const USERNAME_MAX_CHARS: usize = 150;
const NAME_MAX_CHARS: usize = 150;

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
            return Err(DomainError::Validation {
                field: "password",
                message: "must be 8..128 chars",
            });
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
        let username = self.username.trim();
        if username.is_empty() || username.chars().count() > USERNAME_MAX_CHARS {
            return Err(DomainError::Validation {
                field: "username",
                message: "must be 1..150 chars",
            });
        }

        if self.password.is_empty() {
            return Err(DomainError::Validation {
                field: "password",
                message: "must not be empty",
            });
        }
        Ok(Self {
            username: username.to_string(),
            password: self.password,
        })
    }
}

/// Editable part of a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ProfileForm {
    pub(crate) username: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
}

impl ProfileForm {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            username: normalize_username(&self.username)?,
            first_name: normalize_name("first_name", &self.first_name)?,
            last_name: normalize_name("last_name", &self.last_name)?,
            email: normalize_email(&self.email)?,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) created_at: DateTime<Utc>,
}

fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    let len = username.chars().count();
    if !(3..=USERNAME_MAX_CHARS).contains(&len) {
        return Err(DomainError::Validation {
            field: "username",
            message: "must be 3..150 chars",
        });
    }
    // usernames end up in profile URLs
    if !username
        .chars()
        .all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | '@' | '+'))
    {
        return Err(DomainError::Validation {
            field: "username",
            message: "may contain only letters, digits and @.+-_",
        });
    }
    Ok(username.to_string())
}

fn normalize_name(field: &'static str, name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(DomainError::Validation {
            field,
            message: "must be at most 150 chars",
        });
    }
    Ok(name.to_string())
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::{ProfileForm, RegisterRequest, normalize_email, normalize_username};
    use crate::domain::error::DomainError;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let value = normalize_email("  TeSt@Example.COM ").expect("must be valid");
        assert_eq!(value, "test@example.com");
    }

    #[test]
    fn username_rules_are_applied() {
        assert!(normalize_username("ab").is_err());
        assert!(normalize_username("with space").is_err());
        assert!(normalize_username("with/slash").is_err());
        assert!(normalize_username("valid_user").is_ok());
        assert!(normalize_username("first.last+tag@host").is_ok());
    }

    #[test]
    fn register_password_length_is_checked() {
        let short = RegisterRequest {
            username: "valid_user".to_string(),
            email: "test@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(short.validate().is_err());

        let ok = RegisterRequest {
            username: "valid_user".to_string(),
            email: "test@example.com".to_string(),
            password: "very-secure-password".to_string(),
        };
        let validated = ok.validate().expect("must be valid");
        assert_eq!(validated.username, "valid_user");
        assert_eq!(validated.email, "test@example.com");
    }

    #[test]
    fn profile_form_allows_blank_names_but_not_long_ones() {
        let form = ProfileForm {
            username: " writer ".to_string(),
            first_name: "".to_string(),
            last_name: "  Doe ".to_string(),
            email: "Writer@Example.com".to_string(),
        };
        let validated = form.validate().expect("must be valid");
        assert_eq!(validated.username, "writer");
        assert_eq!(validated.first_name, "");
        assert_eq!(validated.last_name, "Doe");
        assert_eq!(validated.email, "writer@example.com");

        let too_long = ProfileForm {
            username: "writer".to_string(),
            first_name: "x".repeat(151),
            last_name: String::new(),
            email: "writer@example.com".to_string(),
        };
        let err = too_long.validate().expect_err("first_name must fail");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "first_name",
                ..
            }
        ));
    }
}
