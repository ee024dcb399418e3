//! Wire protocol for Authline.
//!
//! This crate defines the "language" spoken with the remote auth service:
//!
//! - **Types** ([`AuthUser`], [`TokenResponse`], request bodies, etc.):
//!   the JSON structures that travel on the wire.
//! - **Codec** ([`decode`], [`error_reason`]): how those
//!   structures are read back from bytes, and how a failure body is
//!   boiled down to a human-readable reason.
//! - **Password rules** ([`check_password_strength`]): the complexity
//!   rules the service enforces, checked locally before a request is sent.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! The protocol layer sits below everything else. It doesn't know about
//! tokens, sessions or HTTP; it only knows what the payloads look like.
//!
//! ```text
//! Client (HTTP) → Protocol (typed bodies) → Session (who is logged in)
//! ```

mod codec;
mod error;
mod password;
mod types;

pub use codec::{decode, error_reason};
pub use error::ProtocolError;
pub use password::{PASSWORD_MIN_LENGTH, PASSWORD_RULES, check_password_strength};
pub use types::{
    AuthUser, BindEmailRequest, ChangePasswordRequest, ErrorBody,
    ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest,
    MessageResponse, RegisterRequest, ResetPasswordRequest, Role,
    TokenResponse,
};
