//! Input rules shared by the user-facing services.

use crate::error::DomainError;

pub const PASSWORD_MIN_LEN: usize = 8;

const PASSWORD_SPECIALS: &[char] = &['@', '$', '!', '%', '*', '#', '?', '&'];

/// Reject anything that is not shaped like `local@domain.tld`.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::Validation("email must be a valid email address".to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() && !host.starts_with('.') => {
            Ok(())
        }
        _ => Err(invalid()),
    }
}

/// Minimum length plus at least one letter, one digit and one special character.
pub fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(DomainError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }

    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(&c));

    if !(has_letter && has_digit && has_special) {
        return Err(DomainError::Validation(
            "Password must contain at least one letter, one number, and one special character"
                .to_string(),
        ));
    }

    Ok(())
}

/// Only the length is checked when a password confirms a destructive action.
pub fn validate_password_length(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(DomainError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    Ok(())
}

/// Username seed: the email's local part, dots stripped, lower-cased.
///
/// `john.doe@example.com` becomes `johndoe`.
pub fn base_username(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let base: String = local
        .chars()
        .filter(|c| *c != '.')
        .flat_map(char::to_lowercase)
        .collect();

    if base.is_empty() {
        "user".to_string()
    } else {
        base
    }
}

/// Trim an optional name; blank values become `None`.
pub fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
