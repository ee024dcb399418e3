//! The authenticated request wrapper.
//!
//! Every call to the auth service goes through [`AuthorizedClient`]. For
//! protected calls it:
//!
//! 1. reads the token store and, if a token is present, adds
//!    `Authorization: Bearer <token>`;
//! 2. sends the request;
//! 3. if the answer is `401` *and* a token was attached, clears the store
//!    and publishes the [`UnauthorizedSignal`] exactly once;
//! 4. returns the response untouched, whatever its status.
//!
//! Public calls skip steps 1 and 3.

use std::time::Duration;

use authline_session::UnauthorizedSignal;
use authline_store::TokenStore;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use url::Url;

use crate::ClientError;

const DEFAULT_USER_AGENT: &str = concat!("authline/", env!("CARGO_PKG_VERSION"));

/// Configures an [`AuthorizedClient`].
///
/// ```
/// use std::time::Duration;
/// use authline_client::AuthorizedClientBuilder;
/// use authline_session::UnauthorizedSignal;
/// use authline_store::MemoryTokenStore;
///
/// let client = AuthorizedClientBuilder::new("http://localhost:8000")
///     .timeout(Duration::from_secs(10))
///     .build(MemoryTokenStore::new(), UnauthorizedSignal::new())
///     .unwrap();
/// assert_eq!(client.endpoint("/auth/me"), "http://localhost:8000/auth/me");
/// ```
#[derive(Debug, Clone)]
pub struct AuthorizedClientBuilder {
    base_url: String,
    timeout: Option<Duration>,
    user_agent: String,
}

impl AuthorizedClientBuilder {
    /// Starts a builder for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Total time allowed per request, connect included. No limit by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validates the base URL and builds the client.
    ///
    /// `store` is where bearer tokens are read from (and cleared on a 401);
    /// `signal` is where 401s are published. Pass the same store and signal
    /// to the [`SessionCoordinator`](authline_session::SessionCoordinator).
    ///
    /// # Errors
    /// - [`ClientError::InvalidUrl`] / [`ClientError::UnsupportedUrl`] for
    ///   a bad base URL
    /// - [`ClientError::Build`] if the HTTP client can't be created
    pub fn build<T: TokenStore>(
        self,
        store: T,
        signal: UnauthorizedSignal,
    ) -> Result<AuthorizedClient<T>, ClientError> {
        let base_url = normalize_base_url(&self.base_url)?;

        let mut http = reqwest::Client::builder().user_agent(self.user_agent);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http.build().map_err(ClientError::Build)?;

        tracing::debug!(%base_url, "auth client ready");
        Ok(AuthorizedClient {
            http,
            base_url,
            store,
            signal,
        })
    }
}

/// HTTP client that attaches the stored bearer token and turns a rejected
/// token into an [`UnauthorizedSignal`].
pub struct AuthorizedClient<T> {
    http: reqwest::Client,
    base_url: String,
    store: T,
    signal: UnauthorizedSignal,
}

impl<T: TokenStore> AuthorizedClient<T> {
    /// Shorthand for `AuthorizedClientBuilder::new(base_url).build(store, signal)`.
    pub fn new(
        base_url: &str,
        store: T,
        signal: UnauthorizedSignal,
    ) -> Result<Self, ClientError> {
        AuthorizedClientBuilder::new(base_url).build(store, signal)
    }

    /// The base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path such as `/auth/me`.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    pub fn signal(&self) -> &UnauthorizedSignal {
        &self.signal
    }

    /// Starts a request to `path`. Add a body, query or extra headers, then
    /// hand it to [`execute`](Self::execute) or
    /// [`execute_public`](Self::execute_public). Don't set `Authorization`.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.endpoint(path))
    }

    /// Sends a protected request without a body.
    pub async fn send(&self, method: Method, path: &str) -> Result<Response, ClientError> {
        self.execute(self.request(method, path)).await
    }

    /// Sends a protected request with a JSON body.
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Response, ClientError> {
        self.execute(self.request(method, path).json(body)).await
    }

    /// Sends an unauthenticated request with a JSON body. The token store is
    /// neither read nor cleared, and a 401 is just a response.
    pub async fn send_public_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Response, ClientError> {
        self.execute_public(self.request(method, path).json(body))
            .await
    }

    /// Sends a protected request built with [`request`](Self::request).
    ///
    /// # Errors
    /// - [`ClientError::AuthorizationPreset`] if the builder already carries
    ///   an `Authorization` header
    /// - [`ClientError::MalformedToken`] if the stored token can't be sent
    /// - [`ClientError::Request`] if the builder holds an invalid header or
    ///   body; nothing is sent
    /// - [`ClientError::Transport`] if no response arrived; the store and
    ///   the signal are left alone
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        self.dispatch(builder, true).await
    }

    /// Sends an unauthenticated request built with [`request`](Self::request).
    pub async fn execute_public(
        &self,
        builder: RequestBuilder,
    ) -> Result<Response, ClientError> {
        self.dispatch(builder, false).await
    }

    async fn dispatch(
        &self,
        builder: RequestBuilder,
        authorize: bool,
    ) -> Result<Response, ClientError> {
        let mut request = builder.build().map_err(ClientError::Request)?;
        if request.headers().contains_key(AUTHORIZATION) {
            return Err(ClientError::AuthorizationPreset);
        }

        let token = if authorize { self.store.get() } else { None };
        if let Some(token) = &token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ClientError::MalformedToken)?;
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        let method = request.method().clone();
        let path = request.url().path().to_string();
        let response = self.http.execute(request).await.map_err(|e| {
            tracing::debug!(%method, %path, error = %e, "request failed");
            ClientError::Transport(e)
        })?;

        let status = response.status();
        tracing::debug!(%method, %path, status = status.as_u16(), "response received");

        if status == StatusCode::UNAUTHORIZED && token.is_some() {
            tracing::warn!(%path, "bearer token rejected, clearing it");
            self.store.clear();
            self.signal.publish();
        }

        Ok(response)
    }
}

impl<T> std::fmt::Debug for AuthorizedClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Parses `raw` and strips the trailing slash so endpoint paths can be
/// appended as-is. Path prefixes (`https://host/api`) are kept.
fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let url = Url::parse(raw.trim())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::UnsupportedUrl(format!(
            "scheme `{}` (expected http or https)",
            url.scheme()
        )));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ClientError::UnsupportedUrl(raw.to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ClientError::UnsupportedUrl(format!(
            "{raw} (query and fragment are not allowed)"
        )));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}
