//! Session types: the client's belief about who (if anyone) is logged in.
//!
//! A [`Session`] tracks:
//! - WHO is logged in (`AuthUser`), if anyone
//! - WHICH token proves it
//! - WHERE in the lifecycle we are ([`SessionStatus`])
//!
//! Fields are private: only the coordinator builds sessions, through
//! constructors that uphold the invariant "a user is present if and only
//! if the status is `Authenticated`".

use std::fmt;

use authline_protocol::AuthUser;

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of the session.
///
/// ```text
///   Validating ──(me ok)──→ Authenticated ──(logout / 401)──→ Anonymous
///       │                        ↑                              │
///       └──────(me failed)───────┼──────────────────────────────┤
///                                └─────────(login ok)───────────┘
/// ```
///
/// - **Validating**: startup; a stored token is being checked with the
///   service. The application should show a "verifying" placeholder.
/// - **Authenticated**: a user is logged in.
/// - **Anonymous**: nobody is logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Validating,
    Authenticated,
    Anonymous,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validating => write!(f, "Validating"),
            Self::Authenticated => write!(f, "Authenticated"),
            Self::Anonymous => write!(f, "Anonymous"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A snapshot of the session.
///
/// Cloning is how other components read it; mutating it is reserved for
/// the [`SessionCoordinator`](crate::SessionCoordinator).
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    user: Option<AuthUser>,
    status: SessionStatus,
}

impl Session {
    /// Startup state: checking whatever the token store held.
    pub(crate) fn validating(token: Option<String>) -> Self {
        Self {
            token,
            user: None,
            status: SessionStatus::Validating,
        }
    }

    pub(crate) fn authenticated(user: AuthUser, token: String) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
            status: SessionStatus::Authenticated,
        }
    }

    pub(crate) fn anonymous() -> Self {
        Self {
            token: None,
            user: None,
            status: SessionStatus::Anonymous,
        }
    }

    /// Swaps the identity record, keeping token and status.
    ///
    /// Returns `false` (and changes nothing) unless authenticated.
    pub(crate) fn replace_user(&mut self, user: AuthUser) -> bool {
        if self.status != SessionStatus::Authenticated {
            return false;
        }
        self.user = Some(user);
        true
    }

    /// The bearer token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The logged-in user, present only when authenticated.
    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    /// Current lifecycle state.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns `true` if a user is logged in.
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// Returns `true` while a stored token is being validated.
    pub fn is_validating(&self) -> bool {
        self.status == SessionStatus::Validating
    }
}

/// Tokens are credentials: keep them out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .field("status", &self.status)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// AuthPage
// ---------------------------------------------------------------------------

/// Which unauthenticated view the application should present.
///
/// Replaces routing-by-conditional-render: the application renders
/// whatever page this says while the session isn't authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuthPage {
    #[default]
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
}

impl fmt::Display for AuthPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => write!(f, "login"),
            Self::Register => write!(f, "register"),
            Self::ForgotPassword => write!(f, "forgot-password"),
            Self::ResetPassword => write!(f, "reset-password"),
        }
    }
}
