//! Core protocol types for the auth service's JSON contract.
//!
//! Every type here travels "on the wire": request bodies are serialized
//! and sent, response bodies are received and deserialized. Field names
//! match the service exactly (`snake_case`), so no renaming is needed.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The role an account holds.
///
/// `#[serde(rename_all = "lowercase")]` maps `Role::Admin` to `"admin"`,
/// which is how the service spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May manage invitation codes and other accounts.
    Admin,
    /// A regular account.
    #[default]
    User,
}

impl Role {
    /// Returns `true` for administrator accounts.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

/// The identity record of an account, as returned by `GET /auth/me`,
/// embedded in a login response, or returned by registration.
///
/// The email and timestamps are nullable on the service side; both a
/// JSON `null` and a missing field become `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl AuthUser {
    /// Returns `true` if this account is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub invitation_code: String,
}

/// Body of `PUT /auth/password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Body of `PUT /auth/email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindEmailRequest {
    pub email: String,
}

/// Body of `POST /auth/forgot-password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub username: String,
    pub email: String,
}

/// Body of `POST /auth/reset-password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Successful login: a bearer token plus the identity it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `"bearer"` in practice; kept for completeness.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// A plain acknowledgement such as "password changed".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Answer to a forgot-password request.
///
/// `reset_token` is only filled in by deployments without an email
/// channel (development setups); otherwise the token is mailed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgotPasswordResponse {
    pub message: String,
    #[serde(default)]
    pub reset_token: Option<String>,
}

/// Failure body: `{"detail": ...}`.
///
/// `detail` is usually a string, but request validators send an array of
/// per-field errors, so it's kept as a raw JSON value and interpreted by
/// [`error_reason`](crate::error_reason).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}
