//! Input checks run before any remote call

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::error::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+._%\-]{1,256}@[A-Za-z0-9][A-Za-z0-9\-]{0,64}(\.[A-Za-z0-9][A-Za-z0-9\-]{0,25})+$")
        .expect("email pattern is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn check_sign_in(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(ValidationError::EmptyCredentials);
    }
    Ok(())
}

pub fn check_sign_up(email: &str, password: &str) -> Result<(), ValidationError> {
    check_sign_in(email, password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn check_animal_id(animal_id: &str) -> Result<(), ValidationError> {
    if animal_id.trim().is_empty() {
        return Err(ValidationError::EmptyAnimalId);
    }
    Ok(())
}

/// Local checks of the registration form (required fields, confirmation)
pub fn check_registration(
    email: &str,
    username: &str,
    password: &str,
    confirm_password: &str,
    education_level: &str,
) -> Result<(), ValidationError> {
    let required = [email, username, password, education_level];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(ValidationError::MissingFields);
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn check_password_change(
    current_password: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    if current_password.trim().is_empty() {
        return Err(ValidationError::EmptyCurrentPassword);
    }
    if new_password.trim().is_empty() {
        return Err(ValidationError::EmptyNewPassword);
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if new_password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn check_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    Ok(())
}
