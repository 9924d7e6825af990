//! Shared application state, constructed once at startup.

use std::sync::Arc;

use actorfeatures_core::{ActorRegistry, EnvOverrides, LogJournal};
use tokio::sync::Notify;

use crate::client::{ClientError, RuntimeClient};
use crate::config::{ConfigProvider, HarnessConfig};
use crate::invocation::ActorInvocationHandler;
use crate::sequencer::StateTestSequencer;

/// Services handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<HarnessConfig>,
    pub registry: ActorRegistry,
    pub journal: LogJournal,
    pub env: EnvOverrides,
    pub client: RuntimeClient,
    pub config_provider: ConfigProvider,
    pub invocations: Arc<ActorInvocationHandler>,
    /// Raised when the app must simulate a fatal crash.
    pub fatal: Arc<Notify>,
}

impl AppState {
    /// Build every service from `config`.
    ///
    /// The registered actor type is resolved here, once. Later environment
    /// overrides change the advertised config but not deactivation checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the sidecar client cannot be built.
    pub async fn new(config: HarnessConfig) -> Result<Self, ClientError> {
        let client = RuntimeClient::new(&config.sidecar_base_url, config.client)?;
        let env = EnvOverrides::new();
        let config_provider = ConfigProvider::new(env.clone(), config.default_actor_type.clone());
        let registry = ActorRegistry::new();
        let journal = LogJournal::new();

        let registered_actor_type = config_provider.actor_type().await;
        tracing::info!(actor_type = %registered_actor_type, "Registered actor type");

        let invocations = ActorInvocationHandler::new(
            registry.clone(),
            journal.clone(),
            StateTestSequencer::new(client.clone()),
            registered_actor_type,
            config.work_delay,
        );

        Ok(Self {
            config: Arc::new(config),
            registry,
            journal,
            env,
            client,
            config_provider,
            invocations: Arc::new(invocations),
            fatal: Arc::new(Notify::new()),
        })
    }
}
