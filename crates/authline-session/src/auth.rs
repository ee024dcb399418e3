//! The remote side of authentication.
//!
//! Authline doesn't verify credentials or issue tokens; the auth service
//! does. The [`IdentityService`] trait describes the calls the coordinator
//! needs from it. `authline-client` implements it over HTTP; tests
//! implement it with canned answers.

use authline_protocol::{AuthUser, ForgotPasswordResponse, MessageResponse, TokenResponse};

use crate::SessionError;

/// The remote auth service, as seen by the session coordinator.
///
/// # Trait bounds
///
/// - `Send + Sync` → the service can be shared across async tasks.
/// - `'static` → it owns everything it needs; it lives as long as the
///   coordinator.
///
/// # Contract
///
/// - [`current_user`](Self::current_user), [`change_password`](Self::change_password)
///   and [`bind_email`](Self::bind_email) are *protected*: the
///   implementation authenticates them with the stored token, and on a
///   401 it clears the store and publishes the
///   [`UnauthorizedSignal`](crate::UnauthorizedSignal) before returning
///   [`SessionError::Unauthorized`].
/// - The other calls are public and never touch the token store.
/// - Failures carry a human-readable reason (the service's `detail`, or
///   a generic message).
pub trait IdentityService: Send + Sync + 'static {
    /// `POST /auth/login`.
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<TokenResponse, SessionError>> + Send;

    /// `POST /auth/register`. Returns the created account.
    fn register(
        &self,
        username: &str,
        password: &str,
        invitation_code: &str,
    ) -> impl Future<Output = Result<AuthUser, SessionError>> + Send;

    /// `GET /auth/me` with the stored token.
    fn current_user(
        &self,
    ) -> impl Future<Output = Result<AuthUser, SessionError>> + Send;

    /// `PUT /auth/password`. On success the service revokes every token
    /// issued before the change.
    fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> impl Future<Output = Result<MessageResponse, SessionError>> + Send;

    /// `PUT /auth/email`.
    fn bind_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<MessageResponse, SessionError>> + Send;

    /// `POST /auth/forgot-password`.
    fn forgot_password(
        &self,
        username: &str,
        email: &str,
    ) -> impl Future<Output = Result<ForgotPasswordResponse, SessionError>> + Send;

    /// `POST /auth/reset-password`.
    fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> impl Future<Output = Result<MessageResponse, SessionError>> + Send;
}
