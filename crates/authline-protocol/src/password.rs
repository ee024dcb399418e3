//! Password complexity rules.
//!
//! The service rejects weak passwords on its own, but checking locally
//! first saves a round trip and gives the user a precise message.

/// Minimum number of characters in a password.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Human-readable summary of the rules, also the rejection reason for a
/// password missing a character class.
pub const PASSWORD_RULES: &str =
    "password must be at least 8 characters and contain an uppercase letter, a lowercase letter and a digit";

/// Checks a candidate password against the complexity rules.
///
/// Length is counted in characters, not bytes.
///
/// # Errors
/// Returns the reason the password was rejected.
pub fn check_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        ));
    }

    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !(has_lower && has_upper && has_digit) {
        return Err(PASSWORD_RULES.to_string());
    }

    Ok(())
}
