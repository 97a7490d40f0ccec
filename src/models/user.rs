// src/models/user.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidateEmail};

use crate::error::AppError;

/// Caller role. Stored as lowercase text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    /// Resolves a role requested at registration.
    /// Anything unrecognised falls back to the least privileged role.
    pub fn requested_or_default(requested: Option<&str>) -> Role {
        requested
            .and_then(|r| r.parse().ok())
            .unwrap_or(Role::Student)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            other => Err(AppError::BadRequest(format!("Unknown role '{}'", other))),
        }
    }
}

/// Represents the 'users' table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,

    /// Always stored normalized (trimmed, lowercase).
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    pub role: Role,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Raw row as read from Postgres; `role` is converted after fetching.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|_| AppError::InternalServerError(format!("Stored role '{}' is invalid", row.role)))?;

        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

/// Trims and lowercases an email before any comparison or storage.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Rejects addresses that are not syntactically valid. Expects a normalized email.
pub fn check_email(email: &str) -> Result<(), AppError> {
    if !email.to_owned().validate_email() {
        return Err(AppError::BadRequest(format!("'{}' is not a valid email address", email)));
    }
    Ok(())
}

/// Data needed to insert a user. Fields are already validated and normalized.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Partial update applied by the store. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
    }
}

/// DTO for registration. Missing fields deserialize as empty and are
/// rejected by the credential service.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(max = 100, message = "Name must be at most 100 characters."))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 254, message = "Email must be at most 254 characters."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 128, message = "Password must be at most 128 characters."))]
    pub password: String,
    pub role: Option<String>,
}

/// DTO for user login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// DTO for a user editing their own profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters."))]
    pub name: Option<String>,
    #[validate(length(max = 254, message = "Email must be at most 254 characters."))]
    pub email: Option<String>,
    #[validate(length(max = 128, message = "Password must be at most 128 characters."))]
    pub password: Option<String>,
}

/// DTO for an admin updating any user. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Query parameters for the admin user listing.
#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

/// Token + user payload returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub user: User,
}
