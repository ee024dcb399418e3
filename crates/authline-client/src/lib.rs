//! HTTP client for the Authline auth contract.
//!
//! Two layers:
//!
//! - [`AuthorizedClient`]: sends requests, attaches the stored bearer
//!   token, and on a 401 clears the store and publishes the
//!   [`UnauthorizedSignal`](authline_session::UnauthorizedSignal).
//! - [`AuthApi`]: the typed endpoints (`/auth/login`, `/auth/me`, ...)
//!   on top, implementing [`IdentityService`](authline_session::IdentityService).
//!
//! ```no_run
//! use authline_client::{AuthApi, AuthorizedClient};
//! use authline_session::{SessionCoordinator, UnauthorizedSignal};
//! use authline_store::MemoryTokenStore;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryTokenStore::new());
//! let signal = UnauthorizedSignal::new();
//! let client = AuthorizedClient::new("http://localhost:8000", Arc::clone(&store), signal.clone())?;
//! let coordinator = SessionCoordinator::new(AuthApi::new(client), store, &signal);
//!
//! coordinator.initialize().await;
//! coordinator.login("alice", "Secret123").await?;
//! # Ok(())
//! # }
//! ```

mod api;
mod error;
mod request;

pub use api::AuthApi;
pub use error::ClientError;
pub use request::{AuthorizedClient, AuthorizedClientBuilder};
pub use reqwest::{Method, Response, StatusCode};
