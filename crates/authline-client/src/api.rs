//! [`IdentityService`] over HTTP.
//!
//! Maps each operation to its endpoint and each response to a typed
//! result. Failure reasons come from the service's `detail` field when it
//! is a string, otherwise from a fixed per-operation message.

use authline_protocol::{
    AuthUser, BindEmailRequest, ChangePasswordRequest, ForgotPasswordRequest,
    ForgotPasswordResponse, LoginRequest, MessageResponse, RegisterRequest,
    ResetPasswordRequest, TokenResponse, decode, error_reason,
};
use authline_session::{IdentityService, SessionError};
use authline_store::TokenStore;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::AuthorizedClient;

const LOGIN_FAILED: &str = "login failed";
const REGISTER_FAILED: &str = "registration failed";
const TOKEN_INVALID: &str = "token invalid";
const PASSWORD_CHANGE_FAILED: &str = "password change failed";
const EMAIL_BIND_FAILED: &str = "email binding failed";
const REQUEST_FAILED: &str = "request failed";
const PASSWORD_RESET_FAILED: &str = "password reset failed";

/// The auth service's HTTP contract.
#[derive(Debug)]
pub struct AuthApi<T> {
    client: AuthorizedClient<T>,
}

impl<T: TokenStore> AuthApi<T> {
    pub fn new(client: AuthorizedClient<T>) -> Self {
        Self { client }
    }

    /// The wrapper underneath, for calls outside the auth contract.
    pub fn client(&self) -> &AuthorizedClient<T> {
        &self.client
    }
}

/// Reads a response into `D`, or into the failure it describes.
///
/// A 401 on a protected call becomes [`SessionError::Unauthorized`]; the
/// wrapper has already cleared the store and published by then. Every
/// other non-2xx becomes [`SessionError::Rejected`].
async fn read<D: DeserializeOwned>(
    response: Response,
    protected: bool,
    default_reason: &str,
) -> Result<D, SessionError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(crate::ClientError::Transport)?;

    if status.is_success() {
        return Ok(decode(&body)?);
    }

    let reason = error_reason(&body, default_reason);
    tracing::debug!(status = status.as_u16(), %reason, "request rejected");
    if protected && status == StatusCode::UNAUTHORIZED {
        Err(SessionError::Unauthorized(reason))
    } else {
        Err(SessionError::Rejected(reason))
    }
}

impl<T: TokenStore> IdentityService for AuthApi<T> {
    async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, SessionError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .send_public_json(Method::POST, "/auth/login", &body)
            .await?;
        read(response, false, LOGIN_FAILED).await
    }

    async fn register(
        &self,
        username: &str,
        password: &str,
        invitation_code: &str,
    ) -> Result<AuthUser, SessionError> {
        let body = RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            invitation_code: invitation_code.to_string(),
        };
        let response = self
            .client
            .send_public_json(Method::POST, "/auth/register", &body)
            .await?;
        read(response, false, REGISTER_FAILED).await
    }

    async fn current_user(&self) -> Result<AuthUser, SessionError> {
        let response = self.client.send(Method::GET, "/auth/me").await?;
        // Anything but a 401 just means the token couldn't be confirmed.
        read(response, true, TOKEN_INVALID)
            .await
            .map_err(|e| match e {
                SessionError::Rejected(_) => SessionError::Rejected(TOKEN_INVALID.to_string()),
                other => other,
            })
    }

    async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<MessageResponse, SessionError> {
        let body = ChangePasswordRequest {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        };
        let response = self
            .client
            .send_json(Method::PUT, "/auth/password", &body)
            .await?;
        read(response, true, PASSWORD_CHANGE_FAILED).await
    }

    async fn bind_email(&self, email: &str) -> Result<MessageResponse, SessionError> {
        let body = BindEmailRequest {
            email: email.to_string(),
        };
        let response = self
            .client
            .send_json(Method::PUT, "/auth/email", &body)
            .await?;
        read(response, true, EMAIL_BIND_FAILED).await
    }

    async fn forgot_password(
        &self,
        username: &str,
        email: &str,
    ) -> Result<ForgotPasswordResponse, SessionError> {
        let body = ForgotPasswordRequest {
            username: username.to_string(),
            email: email.to_string(),
        };
        let response = self
            .client
            .send_public_json(Method::POST, "/auth/forgot-password", &body)
            .await?;
        read(response, false, REQUEST_FAILED).await
    }

    async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<MessageResponse, SessionError> {
        let body = ResetPasswordRequest {
            token: token.to_string(),
            new_password: new_password.to_string(),
        };
        let response = self
            .client
            .send_public_json(Method::POST, "/auth/reset-password", &body)
            .await?;
        read(response, false, PASSWORD_RESET_FAILED).await
    }
}
