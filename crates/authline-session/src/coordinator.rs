//! The session coordinator: owns the session and drives its transitions.
//!
//! Responsibilities:
//! - Validating a stored token at startup
//! - Logging in, registering, logging out
//! - Dropping the session when any authenticated call hits a 401
//! - Keeping the cached identity in sync after account changes
//! - Tracking which unauthenticated page should be shown
//!
//! # Concurrency note
//!
//! The session lives in a `tokio::sync::watch` channel. Each transition
//! is one `send_*` call, so observers always see a whole session, and
//! no lock is ever held across an `.await`; operations only suspend
//! while waiting on the network. Token store writes made by a transition
//! happen inside the same `send_*` closure.

use std::sync::Arc;

use authline_protocol::{AuthUser, ForgotPasswordResponse, check_password_strength};
use authline_store::TokenStore;
use tokio::sync::watch;

use crate::signal::Subscription;
use crate::{AuthPage, IdentityService, Session, SessionError, SessionStatus, UnauthorizedSignal};

/// State shared with the unauthorized listener.
struct Shared<T> {
    store: T,
    session: watch::Sender<Session>,
    page: watch::Sender<AuthPage>,
}

impl<T: TokenStore> Shared<T> {
    /// The logout transition: forget the token, become anonymous, go
    /// back to the login page. Safe to repeat.
    fn reset(&self) -> bool {
        let changed = self.session.send_if_modified(|session| {
            self.store.clear();
            if session.status() == SessionStatus::Anonymous
                && session.token().is_none()
            {
                return false;
            }
            *session = Session::anonymous();
            true
        });
        self.page.send_replace(AuthPage::Login);
        changed
    }
}

/// Owns the one [`Session`] of a client and every transition on it.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ initialize() ──→ login() ──→ logout() / 401
///   │             │              │               │
///   ▼             ▼              ▼               ▼
/// [Validating] [Authenticated  [Authenticated] [Anonymous]
///               or Anonymous]
/// ```
///
/// Generic over the remote service `S` and the token store `T`, so the
/// same state machine runs against HTTP in production and against
/// canned answers in tests.
pub struct SessionCoordinator<S, T> {
    service: S,
    shared: Arc<Shared<T>>,
    _unauthorized: Subscription,
}

impl<S, T> SessionCoordinator<S, T>
where
    S: IdentityService,
    T: TokenStore,
{
    /// Creates the coordinator and subscribes it to `signal`.
    ///
    /// The session starts out `Validating` with whatever token `store`
    /// holds; call [`initialize`](Self::initialize) to settle it.
    pub fn new(service: S, store: T, signal: &UnauthorizedSignal) -> Self {
        let (session, _) = watch::channel(Session::validating(store.get()));
        let (page, _) = watch::channel(AuthPage::default());
        let shared = Arc::new(Shared {
            store,
            session,
            page,
        });

        let listener = Arc::clone(&shared);
        let subscription = signal.subscribe(move || {
            if listener.reset() {
                tracing::warn!("session invalidated by the server");
            }
        });

        Self {
            service,
            shared,
            _unauthorized: subscription,
        }
    }

    /// The remote service, for calls the coordinator doesn't wrap.
    pub fn service(&self) -> &S {
        &self.service
    }

    // -- Snapshots --------------------------------------------------------

    /// A copy of the current session.
    pub fn session(&self) -> Session {
        self.shared.session.borrow().clone()
    }

    /// A receiver that sees every transition.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.shared.session.subscribe()
    }

    /// Current lifecycle state.
    pub fn status(&self) -> SessionStatus {
        self.shared.session.borrow().status()
    }

    /// Returns `true` if a user is logged in.
    pub fn is_authenticated(&self) -> bool {
        self.shared.session.borrow().is_authenticated()
    }

    /// The logged-in user, if any.
    pub fn current_user(&self) -> Option<AuthUser> {
        self.shared.session.borrow().user().cloned()
    }

    /// The session's bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.shared.session.borrow().token().map(str::to_string)
    }

    /// The page to show while not authenticated.
    pub fn auth_page(&self) -> AuthPage {
        *self.shared.page.borrow()
    }

    /// A receiver that sees every page change.
    pub fn subscribe_auth_page(&self) -> watch::Receiver<AuthPage> {
        self.shared.page.subscribe()
    }

    /// Switches the unauthenticated page.
    pub fn set_auth_page(&self, page: AuthPage) {
        self.shared.page.send_replace(page);
    }

    // -- Transitions ------------------------------------------------------

    /// Settles the startup `Validating` state.
    ///
    /// - Empty store → `Anonymous`, no network call.
    /// - Stored token accepted by `GET /auth/me` → `Authenticated`.
    /// - Any failure → store cleared, `Anonymous`. Not reported: an
    ///   expired token is routine, not an error.
    ///
    /// If the session leaves `Validating` while the check is in flight
    /// (logout, a 401 elsewhere, a fresh login), the late answer is
    /// discarded and the store is left alone.
    pub async fn initialize(&self) -> Session {
        let Some(token) = self.shared.store.get() else {
            tracing::debug!("no stored token, starting anonymous");
            self.shared.session.send_replace(Session::anonymous());
            return self.session();
        };

        self.shared
            .session
            .send_replace(Session::validating(Some(token.clone())));
        tracing::debug!("validating stored token");

        match self.service.current_user().await {
            Ok(user) => {
                let username = user.username.clone();
                let applied = self.shared.session.send_if_modified(|session| {
                    if !is_validating_token(session, &token) {
                        return false;
                    }
                    *session = Session::authenticated(user, token.clone());
                    true
                });
                if applied {
                    tracing::info!(%username, "stored token accepted");
                } else {
                    tracing::debug!("session changed during validation, result discarded");
                }
            }
            Err(e) => {
                let applied = self.shared.session.send_if_modified(|session| {
                    if !is_validating_token(session, &token) {
                        return false;
                    }
                    self.shared.store.clear();
                    *session = Session::anonymous();
                    true
                });
                if applied {
                    tracing::info!(reason = %e, "stored token rejected, starting anonymous");
                } else {
                    tracing::debug!("session changed during validation, failure ignored");
                }
            }
        }

        self.session()
    }

    /// Logs in and, on success, persists the token and becomes
    /// `Authenticated` in one step.
    ///
    /// # Errors
    /// Whatever the service reported; the session is left as it was.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthUser, SessionError> {
        let response = match self.service.login(username, password).await {
            Ok(response) => response,
            Err(e) => {
                tracing::info!(%username, reason = %e, "login failed");
                return Err(e);
            }
        };

        let user = response.user.clone();
        self.shared.session.send_modify(|session| {
            self.shared.store.set(&response.access_token);
            *session = Session::authenticated(response.user, response.access_token);
        });

        tracing::info!(username = %user.username, role = %user.role, "logged in");
        Ok(user)
    }

    /// Creates an account. Does not log in: what happens next (usually
    /// showing the login page) is up to the caller.
    ///
    /// # Errors
    /// Whatever the service reported.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        invitation_code: &str,
    ) -> Result<AuthUser, SessionError> {
        let user = self
            .service
            .register(username, password, invitation_code)
            .await
            .inspect_err(|e| tracing::info!(%username, reason = %e, "registration failed"))?;
        tracing::info!(username = %user.username, "account registered");
        Ok(user)
    }

    /// Forgets the token and becomes `Anonymous`. Never fails; calling it
    /// again changes nothing.
    pub fn logout(&self) {
        if self.shared.reset() {
            tracing::info!("logged out");
        }
    }

    /// Same transition as [`logout`](Self::logout), for callers that
    /// learned about an expired session on their own.
    pub fn handle_unauthorized(&self) {
        if self.shared.reset() {
            tracing::warn!("session invalidated");
        }
    }

    /// Replaces the cached identity without touching token or status.
    ///
    /// Returns `false` and ignores `user` unless authenticated, so an
    /// anonymous session can never gain a user.
    pub fn update_user(&self, user: AuthUser) -> bool {
        let updated = self
            .shared
            .session
            .send_if_modified(|session| session.replace_user(user));
        if !updated {
            tracing::debug!("update_user ignored: not authenticated");
        }
        updated
    }

    /// Changes the password, then logs out: the service revokes every
    /// token issued before the change, including ours.
    ///
    /// Returns the service's confirmation message.
    ///
    /// # Errors
    /// - [`SessionError::NotAuthenticated`] if nobody is logged in
    /// - whatever the service reported (the session is kept, unless the
    ///   failure was a 401)
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<String, SessionError> {
        let token = self.require_authenticated()?;
        let response = self
            .service
            .change_password(old_password, new_password)
            .await?;

        // Only the account whose password changed loses its token.
        if self.holds_token(&token) && self.shared.reset() {
            tracing::info!("password changed, session closed");
        } else {
            tracing::debug!("password changed after the session moved on, session kept");
        }
        Ok(response.message)
    }

    /// Binds an email address to the account and updates the cached
    /// identity to match, without re-fetching it.
    ///
    /// Returns the service's confirmation message.
    ///
    /// # Errors
    /// - [`SessionError::NotAuthenticated`] if nobody is logged in
    /// - whatever the service reported
    pub async fn bind_email(&self, email: &str) -> Result<String, SessionError> {
        let token = self.require_authenticated()?;
        let response = self.service.bind_email(email).await?;

        let applied = self.shared.session.send_if_modified(|session| {
            if !is_authenticated_with(session, &token) {
                return false;
            }
            let Some(mut user) = session.user().cloned() else {
                return false;
            };
            user.email = Some(email.to_string());
            session.replace_user(user)
        });
        if applied {
            tracing::info!("email bound");
        } else {
            tracing::debug!("email bound after the session moved on, cached user kept");
        }
        Ok(response.message)
    }

    /// Asks the service to start a password reset.
    ///
    /// The reset token is usually mailed; deployments without mail return
    /// it in the response instead.
    ///
    /// # Errors
    /// Whatever the service reported.
    pub async fn request_password_reset(
        &self,
        username: &str,
        email: &str,
    ) -> Result<ForgotPasswordResponse, SessionError> {
        self.service.forgot_password(username, email).await
    }

    /// Sets a new password using a reset token.
    ///
    /// Checks locally first (both entries match, the password meets the
    /// complexity rules) and sends nothing if they don't.
    ///
    /// Returns the service's confirmation message. The session is not
    /// touched: the user logs in afterwards.
    ///
    /// # Errors
    /// - [`SessionError::InvalidInput`] for a missing token, mismatched
    ///   entries or a weak password
    /// - whatever the service reported
    pub async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<String, SessionError> {
        if reset_token.trim().is_empty() {
            return Err(SessionError::InvalidInput(
                "reset token is required".to_string(),
            ));
        }
        if new_password != confirm_password {
            return Err(SessionError::InvalidInput(
                "passwords do not match".to_string(),
            ));
        }
        check_password_strength(new_password).map_err(SessionError::InvalidInput)?;

        let response = self
            .service
            .reset_password(reset_token, new_password)
            .await?;
        tracing::info!("password reset");
        Ok(response.message)
    }

    /// The token of the authenticated session, captured before a remote
    /// call so its answer can be matched back to the same session.
    fn require_authenticated(&self) -> Result<String, SessionError> {
        let session = self.shared.session.borrow();
        match session.token() {
            Some(token) if session.is_authenticated() => Ok(token.to_string()),
            _ => Err(SessionError::NotAuthenticated),
        }
    }

    fn holds_token(&self, token: &str) -> bool {
        is_authenticated_with(&self.shared.session.borrow(), token)
    }
}

fn is_validating_token(session: &Session, token: &str) -> bool {
    session.is_validating() && session.token() == Some(token)
}

fn is_authenticated_with(session: &Session, token: &str) -> bool {
    session.is_authenticated() && session.token() == Some(token)
}
