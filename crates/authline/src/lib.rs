//! # Authline
//!
//! Client-side session and bearer token lifecycle for HTTP auth services.
//!
//! Authline keeps one answer to "who is logged in?" consistent across an
//! application: it validates a persisted token at startup, logs in and
//! out, attaches the token to outgoing requests, and drops the session
//! the moment any request comes back `401`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use authline::prelude::*;
//!
//! # async fn run() -> Result<(), AuthlineError> {
//! authline::init_tracing("authline=info")?;
//!
//! let config = AuthlineConfig::load(None)?;
//! let auth = Authline::from_config(config)?;
//!
//! match auth.coordinator().initialize().await.status() {
//!     SessionStatus::Authenticated => {}
//!     _ => {
//!         auth.coordinator().login("alice", "Secret123").await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod app;
mod config;
mod error;
mod telemetry;

pub use app::{Authline, AuthlineBuilder, Coordinator, SharedStore};
pub use config::{AuthlineConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_KEY};
pub use error::{AuthlineError, ConfigError};
pub use telemetry::init_tracing;

pub use authline_client as client;
pub use authline_protocol as protocol;
pub use authline_session as session;
pub use authline_store as store;

pub mod prelude {
    pub use crate::{Authline, AuthlineBuilder, AuthlineConfig, AuthlineError, init_tracing};
    pub use authline_client::{AuthApi, AuthorizedClient, ClientError};
    pub use authline_protocol::{AuthUser, Role};
    pub use authline_session::{
        AuthPage, IdentityService, Session, SessionCoordinator, SessionError, SessionStatus,
        UnauthorizedSignal,
    };
    pub use authline_store::{FileTokenStore, MemoryTokenStore, TokenStore};
}
