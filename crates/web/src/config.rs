//! App configuration and the actor-type registration descriptor.

use std::time::Duration;

use actorfeatures_core::EnvOverrides;
use serde::{Deserialize, Serialize};

use crate::client::ClientConfig;

/// Actor type used when `TEST_APP_ACTOR_TYPE` is unset.
pub const DEFAULT_ACTOR_TYPE: &str = "testactorfeatures";
/// Overrides the registered actor type. Must be unique per test app.
pub const ACTOR_TYPE_ENV: &str = "TEST_APP_ACTOR_TYPE";
/// Sets the reminder storage partition count.
pub const REMINDERS_PARTITIONS_ENV: &str = "TEST_APP_ACTOR_REMINDERS_PARTITIONS";

const ACTOR_IDLE_TIMEOUT: &str = "1h";
const ACTOR_SCAN_INTERVAL: &str = "30s";
const DRAIN_ONGOING_CALL_TIMEOUT: &str = "30s";
const DRAIN_REBALANCED_ACTORS: bool = true;

/// App configuration, constructed once at startup.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Address to bind to (e.g., "0.0.0.0:3000")
    pub bind_address: String,
    /// Sidecar HTTP API root (e.g., "http://localhost:3500/v1.0")
    pub sidecar_base_url: String,
    /// Actor type registered when the environment does not name one.
    pub default_actor_type: String,
    /// Simulated work per non-timer, non-reminder method call.
    pub work_delay: Duration,
    /// Timeouts for sidecar calls.
    pub client: ClientConfig,
    /// How long in-flight requests may drain after a termination signal.
    pub shutdown_grace: Duration,
    /// Delay between a successful `/test/shutdown` and the simulated crash.
    pub fatal_exit_delay: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            sidecar_base_url: "http://localhost:3500/v1.0".to_string(),
            default_actor_type: DEFAULT_ACTOR_TYPE.to_string(),
            work_delay: Duration::from_secs(5),
            client: ClientConfig::default(),
            shutdown_grace: Duration::from_secs(1),
            fatal_exit_delay: Duration::from_secs(1),
        }
    }
}

impl HarnessConfig {
    /// Set the bind address.
    #[must_use]
    pub fn bind_address(mut self, address: impl Into<String>) -> Self {
        self.bind_address = address.into();
        self
    }

    /// Set the sidecar API root.
    #[must_use]
    pub fn sidecar_base_url(mut self, url: impl Into<String>) -> Self {
        self.sidecar_base_url = url.into();
        self
    }

    /// Set the fallback actor type.
    #[must_use]
    pub fn default_actor_type(mut self, actor_type: impl Into<String>) -> Self {
        self.default_actor_type = actor_type.into();
        self
    }

    /// Set the simulated work delay.
    #[must_use]
    pub const fn work_delay(mut self, delay: Duration) -> Self {
        self.work_delay = delay;
        self
    }

    /// Set the delay before a simulated fatal exit.
    #[must_use]
    pub const fn fatal_exit_delay(mut self, delay: Duration) -> Self {
        self.fatal_exit_delay = delay;
        self
    }
}

/// Registration descriptor the sidecar reads during actor-type discovery.
///
/// Empty and zero fields are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorTypeConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub actor_idle_timeout: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub actor_scan_interval: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub drain_ongoing_call_timeout: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub drain_rebalanced_actors: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub reminders_storage_partitions: u32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Resolves actor-type settings through the environment overrides.
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    env: EnvOverrides,
    default_actor_type: String,
}

impl ConfigProvider {
    /// Create a provider reading `env`.
    pub fn new(env: EnvOverrides, default_actor_type: impl Into<String>) -> Self {
        Self {
            env,
            default_actor_type: default_actor_type.into(),
        }
    }

    /// The actor type this app hosts right now.
    pub async fn actor_type(&self) -> String {
        let actor_type = self.env.get(ACTOR_TYPE_ENV).await;
        if actor_type.is_empty() {
            self.default_actor_type.clone()
        } else {
            actor_type
        }
    }

    /// Reminder partition count; unset or unparsable means 0.
    pub async fn reminders_partitions(&self) -> u32 {
        self.env
            .get(REMINDERS_PARTITIONS_ENV)
            .await
            .trim()
            .parse()
            .unwrap_or(0)
    }

    /// The descriptor served at `/dapr/config`.
    pub async fn descriptor(&self) -> ActorTypeConfig {
        ActorTypeConfig {
            entities: vec![self.actor_type().await],
            actor_idle_timeout: ACTOR_IDLE_TIMEOUT.to_string(),
            actor_scan_interval: ACTOR_SCAN_INTERVAL.to_string(),
            drain_ongoing_call_timeout: DRAIN_ONGOING_CALL_TIMEOUT.to_string(),
            drain_rebalanced_actors: DRAIN_REBALANCED_ACTORS,
            reminders_storage_partitions: self.reminders_partitions().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_config_default() {
        let config = HarnessConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert_eq!(config.sidecar_base_url, "http://localhost:3500/v1.0");
        assert_eq!(config.default_actor_type, "testactorfeatures");
        assert_eq!(config.work_delay, Duration::from_secs(5));
        assert_eq!(config.shutdown_grace, Duration::from_secs(1));
    }

    #[test]
    fn test_harness_config_builders() {
        let config = HarnessConfig::default()
            .bind_address("127.0.0.1:0")
            .sidecar_base_url("http://sidecar:3500/v1.0")
            .default_actor_type("otheractor")
            .work_delay(Duration::from_millis(10));
        assert_eq!(config.bind_address, "127.0.0.1:0");
        assert_eq!(config.sidecar_base_url, "http://sidecar:3500/v1.0");
        assert_eq!(config.default_actor_type, "otheractor");
        assert_eq!(config.work_delay, Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_descriptor_uses_override_and_partitions() -> Result<(), serde_json::Error> {
        let env = EnvOverrides::new();
        env.set(ACTOR_TYPE_ENV, "renamedactor").await;
        env.set(REMINDERS_PARTITIONS_ENV, "7").await;
        let provider = ConfigProvider::new(env, DEFAULT_ACTOR_TYPE);

        let json = serde_json::to_value(provider.descriptor().await)?;
        assert_eq!(
            json,
            serde_json::json!({
                "entities": ["renamedactor"],
                "actorIdleTimeout": "1h",
                "actorScanInterval": "30s",
                "drainOngoingCallTimeout": "30s",
                "drainRebalancedActors": true,
                "remindersStoragePartitions": 7
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_unparsable_partitions_are_omitted() -> Result<(), serde_json::Error> {
        let env = EnvOverrides::new();
        env.set(REMINDERS_PARTITIONS_ENV, "many").await;
        let provider = ConfigProvider::new(env, DEFAULT_ACTOR_TYPE);

        assert_eq!(provider.reminders_partitions().await, 0);
        let json = serde_json::to_value(provider.descriptor().await)?;
        assert!(json.get("remindersStoragePartitions").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_override_falls_back_to_default_type() {
        let env = EnvOverrides::new();
        env.set(ACTOR_TYPE_ENV, "").await;
        let provider = ConfigProvider::new(env, "fallbackactor");
        assert_eq!(provider.actor_type().await, "fallbackactor");
    }
}
