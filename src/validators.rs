//! Input validators for user registration and post submission.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_PASSWORD_LENGTH: usize = 72; // bcrypt input limit
const MAX_POST_LENGTH: usize = 140;

/// Words masked out of post bodies before storage.
const PROFANE_WORDS: [&str; 3] = ["blatherskite", "fopdoodle", "snollygoster"];

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validates an email address and returns the trimmed, canonical form.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong(
            "email".to_string(),
            MAX_EMAIL_LENGTH,
        ));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates that a password is present and within bcrypt's input limit.
///
/// No strength rules beyond that: any non-empty password of reasonable size
/// is hashable, and the policy decision belongs to clients.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        ));
    }

    Ok(())
}

/// Validates a post body against the length limit.
pub fn validate_post_body(body: &str) -> Result<(), ValidationError> {
    if body.trim().is_empty() {
        return Err(ValidationError::EmptyField("body".to_string()));
    }

    if body.len() > MAX_POST_LENGTH {
        return Err(ValidationError::TooLong("body".to_string(), MAX_POST_LENGTH));
    }

    Ok(())
}

/// Replaces each banned word with `****`.
///
/// Matching is case-insensitive on whole whitespace-separated words;
/// punctuation attached to a word defeats the mask, which is accepted.
/// Runs of whitespace collapse to single spaces in the output.
pub fn clean_profanity(body: &str) -> String {
    body.split_whitespace()
        .map(|word| {
            if PROFANE_WORDS.contains(&word.to_lowercase().as_str()) {
                "****"
            } else {
                word
            }
        })
        .collect::<Vec<&str>>()
        .join(" ")
}
