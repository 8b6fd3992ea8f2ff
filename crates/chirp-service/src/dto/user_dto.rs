//! User-related DTOs.

use chirp_core::validation::rules::valid_username;
use chirp_core::NewUser;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to register a new user.
///
/// The password is hashed by the caller before the user is stored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(custom(function = "valid_username"))]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 64, message = "Display name must be 1-64 characters"))]
    pub display_name: String,

    #[validate(url(message = "Invalid avatar URL"))]
    pub avatar_url: Option<String>,
}

impl RegisterUserRequest {
    /// Converts into an insertable user with the given password hash.
    #[must_use]
    pub fn into_new_user(self, password_hash: String) -> NewUser {
        NewUser {
            username: self.username,
            email: self.email.to_lowercase(),
            display_name: self.display_name,
            avatar_url: self.avatar_url,
            password_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirp_core::ValidateExt;

    fn request() -> RegisterUserRequest {
        RegisterUserRequest {
            username: "alice".to_string(),
            email: "Alice@Example.com".to_string(),
            display_name: "Alice".to_string(),
            avatar_url: None,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate_request().is_ok());
    }

    #[test]
    fn test_invalid_fields() {
        let mut bad = request();
        bad.username = "1alice".to_string();
        assert!(bad.validate_request().is_err());

        let mut bad = request();
        bad.email = "not-an-email".to_string();
        assert!(bad.validate_request().is_err());

        let mut bad = request();
        bad.avatar_url = Some("nope".to_string());
        assert!(bad.validate_request().is_err());
    }

    #[test]
    fn test_into_new_user_normalizes_email() {
        let user = request().into_new_user("hash".to_string());
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.password_hash, "hash");
    }
}
