//! `Authline` builder: wires store → signal → client → coordinator.
//!
//! This is the entry point for applications. It ties together all the
//! layers so that the request wrapper and the session coordinator share
//! one token store and one unauthorized signal.

use std::sync::Arc;

use authline_client::{AuthApi, AuthorizedClient, AuthorizedClientBuilder};
use authline_session::{SessionCoordinator, UnauthorizedSignal};
use authline_store::{FileTokenStore, MemoryTokenStore, TokenStore};

use crate::{AuthlineConfig, AuthlineError};

/// The token store behind an [`Authline`], whatever its kind.
pub type SharedStore = Arc<dyn TokenStore>;

/// The coordinator type an [`Authline`] builds.
pub type Coordinator = SessionCoordinator<AuthApi<SharedStore>, SharedStore>;

enum StoreChoice {
    /// File named after `token_key`, in `token_dir` or the config dir.
    File,
    Memory,
    Custom(SharedStore),
}

/// Builder for configuring an [`Authline`] client.
///
/// # Example
///
/// ```rust,no_run
/// use authline::prelude::*;
///
/// # async fn run() -> Result<(), AuthlineError> {
/// let auth = Authline::builder()
///     .api_url("https://auth.example.com")
///     .build()?;
///
/// auth.coordinator().initialize().await;
/// if !auth.coordinator().is_authenticated() {
///     auth.coordinator().login("alice", "Secret123").await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct AuthlineBuilder {
    config: AuthlineConfig,
    store: StoreChoice,
}

impl AuthlineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: AuthlineConfig::default(),
            store: StoreChoice::File,
        }
    }

    /// Replaces every setting with `config`.
    pub fn config(mut self, config: AuthlineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the auth service's base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Keeps the token in memory only: every start is a fresh start.
    pub fn in_memory(mut self) -> Self {
        self.store = StoreChoice::Memory;
        self
    }

    /// Uses a caller-provided token store.
    pub fn store(mut self, store: impl TokenStore) -> Self {
        self.store = StoreChoice::Custom(Arc::new(store));
        self
    }

    /// Validates the configuration, opens the store and wires the layers.
    ///
    /// The session starts out `Validating`; call
    /// [`SessionCoordinator::initialize`] before reading it.
    pub fn build(self) -> Result<Authline, AuthlineError> {
        self.config.validate()?;

        let store: SharedStore = match self.store {
            StoreChoice::File => {
                let store = match &self.config.token_dir {
                    Some(dir) => FileTokenStore::open(dir, &self.config.token_key)?,
                    None => FileTokenStore::open_default(&self.config.token_key)?,
                };
                Arc::new(store)
            }
            StoreChoice::Memory => Arc::new(MemoryTokenStore::new()),
            StoreChoice::Custom(store) => store,
        };

        let signal = UnauthorizedSignal::new();
        let client = AuthorizedClientBuilder::new(self.config.api_url.as_str())
            .timeout(self.config.timeout())
            .build(Arc::clone(&store), signal.clone())?;
        let coordinator = SessionCoordinator::new(AuthApi::new(client), store, &signal);

        tracing::info!(api_url = %self.config.api_url, "authline ready");

        Ok(Authline {
            coordinator,
            signal,
            config: self.config,
        })
    }
}

impl Default for AuthlineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully wired client: one store, one signal, one coordinator.
pub struct Authline {
    coordinator: Coordinator,
    signal: UnauthorizedSignal,
    config: AuthlineConfig,
}

impl Authline {
    /// Creates a new builder for configuring the client.
    pub fn builder() -> AuthlineBuilder {
        AuthlineBuilder::new()
    }

    /// Builds from a loaded configuration with the file-backed store.
    pub fn from_config(config: AuthlineConfig) -> Result<Self, AuthlineError> {
        Self::builder().config(config).build()
    }

    /// Session state and operations.
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// The bearer-injecting HTTP client, for application endpoints beyond
    /// `/auth/*`. A 401 there logs the session out too.
    pub fn client(&self) -> &AuthorizedClient<SharedStore> {
        self.coordinator.service().client()
    }

    /// The signal published on every rejected token.
    pub fn signal(&self) -> &UnauthorizedSignal {
        &self.signal
    }

    pub fn config(&self) -> &AuthlineConfig {
        &self.config
    }
}
