use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password must be at least {0} characters long")]
    TooShort(usize),
    #[error("Password must be no more than {0} characters long")]
    TooLong(usize),
    #[error("Password must contain at least one uppercase letter")]
    NoUppercase,
    #[error("Password must contain at least one lowercase letter")]
    NoLowercase,
    #[error("Password must contain at least one number")]
    NoNumber,
    #[error("Password must contain at least one special character")]
    NoSpecialChar,
    #[error("Failed to hash password")]
    HashingFailed,
    #[error("Failed to verify password")]
    VerificationFailed,
}

impl PasswordError {
    /// Policy violations are the caller's fault; hashing failures are ours
    pub fn is_policy_violation(&self) -> bool {
        !matches!(self, PasswordError::HashingFailed | PasswordError::VerificationFailed)
    }
}

/// Password strength requirements
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_number: bool,
    pub require_special_char: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_uppercase: true,
            require_lowercase: true,
            require_number: true,
            require_special_char: false,
        }
    }
}

/// Validate password strength according to policy
pub fn validate_password_strength(password: &str, policy: &PasswordPolicy) -> Result<(), PasswordError> {
    let length = password.chars().count();
    if length < policy.min_length {
        return Err(PasswordError::TooShort(policy.min_length));
    }

    if length > policy.max_length {
        return Err(PasswordError::TooLong(policy.max_length));
    }

    if policy.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
        return Err(PasswordError::NoUppercase);
    }

    if policy.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
        return Err(PasswordError::NoLowercase);
    }

    if policy.require_number && !password.chars().any(|c| c.is_numeric()) {
        return Err(PasswordError::NoNumber);
    }

    if policy.require_special_char && password.chars().all(|c| c.is_alphanumeric()) {
        return Err(PasswordError::NoSpecialChar);
    }

    Ok(())
}

/// Hash a password using bcrypt
pub fn hash_password(password: &str, policy: &PasswordPolicy) -> Result<String, PasswordError> {
    validate_password_strength(password, policy)?;

    hash(password, DEFAULT_COST).map_err(|_| PasswordError::HashingFailed)
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    verify(password, hash).map_err(|_| PasswordError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_validation() {
        let policy = PasswordPolicy::default();

        assert!(matches!(
            validate_password_strength("short", &policy),
            Err(PasswordError::TooShort(8))
        ));

        assert!(matches!(
            validate_password_strength("lowercase123", &policy),
            Err(PasswordError::NoUppercase)
        ));

        assert!(matches!(
            validate_password_strength("UPPERCASE123", &policy),
            Err(PasswordError::NoLowercase)
        ));

        assert!(matches!(
            validate_password_strength("Password", &policy),
            Err(PasswordError::NoNumber)
        ));

        assert!(validate_password_strength("Password123", &policy).is_ok());
    }

    #[test]
    fn test_special_char_policy() {
        let policy = PasswordPolicy {
            require_special_char: true,
            ..PasswordPolicy::default()
        };

        assert!(matches!(
            validate_password_strength("Password123", &policy),
            Err(PasswordError::NoSpecialChar)
        ));
        assert!(validate_password_strength("Password123!", &policy).is_ok());
    }

    #[test]
    fn test_password_hashing() {
        let password = "TestPassword123";
        let hash = hash_password(password, &PasswordPolicy::default()).unwrap();

        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("WrongPassword1", &hash).unwrap());
    }

    #[test]
    fn test_policy_violation_classification() {
        assert!(PasswordError::NoNumber.is_policy_violation());
        assert!(!PasswordError::HashingFailed.is_policy_violation());
    }
}
