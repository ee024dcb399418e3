//! Session management for Authline.
//!
//! This crate owns the client's authentication lifecycle:
//!
//! 1. **Remote calls**: what the auth service can do ([`IdentityService`] trait)
//! 2. **Session state**: who is logged in ([`Session`], [`SessionStatus`])
//! 3. **Transitions**: startup validation, login, logout
//!    ([`SessionCoordinator`])
//! 4. **Forced logout**: reacting to a 401 from any call
//!    ([`UnauthorizedSignal`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Application (above)  ← reads session snapshots, calls coordinator operations
//!     ↕
//! Session Layer (this crate)  ← owns the session, subscribes to 401s
//!     ↕
//! Client Layer (below)  ← HTTP calls, bearer header, publishes 401s
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod coordinator;
mod error;
mod session;
mod signal;

pub use auth::IdentityService;
pub use coordinator::SessionCoordinator;
pub use error::SessionError;
pub use session::{AuthPage, Session, SessionStatus};
pub use signal::{Subscription, UnauthorizedSignal};
