/// Password hashing and verification
///
/// bcrypt with the library's default cost (12) and a fresh random salt per
/// hash. Hashing runs only when a password value is created or changed;
/// unrelated user updates never re-hash.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Hash a password after checking strength requirements.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    validate_password_strength(password)?;

    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its stored hash using bcrypt's own
/// comparison routine.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

/// Strength requirements: 8-128 characters with at least one digit, one
/// lowercase letter, one uppercase letter, and one special character.
fn validate_password_strength(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        )));
    }

    // bcrypt limitation and DoS prevention
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        )));
    }

    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if !has_digit || !has_lowercase || !has_uppercase || !has_special {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            "password must contain at least one digit, one lowercase letter, one uppercase letter, and one special character"
                .to_string(),
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_bcrypt() {
        let password = "ValidPass123!";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));

        // A second hash of the same password uses a different salt
        let other = hash_password(password).expect("Failed to hash password");
        assert_ne!(hash, other);
    }

    #[test]
    fn correct_password_verifies() {
        let password = "ValidPass123!";
        let hash = hash_password(password).expect("Failed to hash password");

        assert!(verify_password(password, &hash).expect("Failed to verify password"));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hash = hash_password("ValidPass123!").expect("Failed to hash password");

        assert!(!verify_password("WrongPass123!", &hash).expect("Failed to verify password"));
    }

    #[test]
    fn weak_passwords_rejected() {
        assert!(hash_password("Sh0rt!").is_err()); // too short
        assert!(hash_password(&("a".repeat(127) + "A1!")).is_err()); // too long
        assert!(hash_password("nouppercase1!").is_err());
        assert!(hash_password("NOLOWERCASE1!").is_err());
        assert!(hash_password("NoDigitsHere!").is_err());
        assert!(hash_password("NoSpecial123").is_err());
    }

    #[test]
    fn strong_password_accepted() {
        assert!(hash_password("Abc123!@").is_ok());
    }
}
