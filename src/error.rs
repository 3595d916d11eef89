//! Error types shared by every collaborator boundary
//!
//! Expected failures (validation, missing documents, backend faults) travel as
//! values of [`Error`]. Controllers turn them into display messages.

use thiserror::Error;

/// Input rejected before any remote call was made
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Email and password cannot be empty")]
    EmptyCredentials,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Animal ID cannot be empty")]
    EmptyAnimalId,

    #[error("All fields are required")]
    MissingFields,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Please enter your current password")]
    EmptyCurrentPassword,

    #[error("Please enter a new password")]
    EmptyNewPassword,

    #[error("Username cannot be empty")]
    EmptyUsername,
}

/// Errors returned by the gateway, the auth layer and the AR gate
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{collection} document not found: {id}")]
    NotFound { collection: String, id: String },

    #[error("Malformed field '{field}' in document {id}: {reason}")]
    Malformed {
        id: String,
        field: String,
        reason: String,
    },

    #[error("{0}")]
    Backend(String),

    #[error("User not logged in")]
    NotSignedIn,

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("An account already exists for {0}")]
    AccountExists(String),

    #[error("Current password is incorrect")]
    WrongPassword,

    #[error("New password is too weak")]
    WeakPassword,

    #[error("{0}")]
    Ar(String),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Malformed,
    Backend,
    Auth,
    Ar,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Malformed { .. } => ErrorKind::Malformed,
            Error::Backend(_) => ErrorKind::Backend,
            Error::NotSignedIn
            | Error::InvalidCredentials(_)
            | Error::AccountExists(_)
            | Error::WrongPassword
            | Error::WeakPassword => ErrorKind::Auth,
            Error::Ar(_) => ErrorKind::Ar,
        }
    }

    pub fn not_found(collection: &str, id: &str) -> Self {
        Error::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn malformed(id: &str, field: &str, reason: impl Into<String>) -> Self {
        Error::Malformed {
            id: id.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Message shown to the user, falling back to `fallback` when the error
    /// renders as an empty string.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_distinct() {
        let messages = [
            ValidationError::EmptyCredentials.to_string(),
            ValidationError::PasswordTooShort.to_string(),
            ValidationError::InvalidEmail.to_string(),
        ];
        assert_eq!(messages[0], "Email and password cannot be empty");
        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(Error::not_found("animals", "x").kind(), ErrorKind::NotFound);
        assert_eq!(Error::WrongPassword.kind(), ErrorKind::Auth);
        assert_eq!(
            Error::from(ValidationError::EmptyAnimalId).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_user_message_fallback() {
        assert_eq!(
            Error::Backend(String::new()).user_message("Failed to load"),
            "Failed to load"
        );
        assert_eq!(
            Error::Backend("offline".into()).user_message("Failed to load"),
            "offline"
        );
    }
}
