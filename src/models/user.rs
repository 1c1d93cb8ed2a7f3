// src/models/user.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Name of the role allowed into the admin routes.
pub const ADMIN_ROLE: &str = "admin";

/// Role given to self-registered accounts.
pub const PEOPLE_ROLE: &str = "people";

/// Represents the 'roles' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

/// A row of 'users' joined with its role name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,

    /// Unique login.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    pub first_name: String,
    pub last_name: String,

    /// 'admin' or 'people'.
    pub role: String,

    /// Deactivated accounts cannot log in.
    pub is_active: bool,

    pub created_at: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
}

/// Column list shared by every query returning a `User`.
pub const USER_COLUMNS: &str = r#"
    u.id, u.email, u.password_hash, u.first_name, u.last_name,
    r.name AS role, u.is_active, u.created_at, u.last_login
"#;

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be at least 8 characters long."
    ))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
    #[validate(length(min = 1, max = 100, message = "First name is required."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required."))]
    pub last_name: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 120))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Admin dashboard payload: every account and every role.
#[derive(Debug, Serialize)]
pub struct UserDirectory {
    pub users: Vec<User>,
    pub roles: Vec<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            email: "jane@example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
        }
    }

    #[test]
    fn test_register_request_valid() {
        assert!(request("password123", "password123").validate().is_ok());
    }

    #[test]
    fn test_register_request_short_password() {
        let errors = request("short", "short").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_register_request_mismatched_passwords() {
        let errors = request("password123", "password124").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("confirm_password"));
    }

    #[test]
    fn test_register_request_requires_names() {
        let mut req = request("password123", "password123");
        req.first_name.clear();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("first_name"));
    }
}
