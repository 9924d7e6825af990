//! Process-local overrides for environment variables.
//!
//! Test drivers simulate configuration changes by overriding variables over
//! HTTP instead of restarting the app.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Override map consulted before the real process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl EnvOverrides {
    /// Create an empty override set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The override for `name`, else the process environment, else empty.
    pub async fn get(&self, name: &str) -> String {
        if let Some(value) = self.values.read().await.get(name) {
            return value.clone();
        }
        std::env::var(name).unwrap_or_default()
    }

    /// Override `name` for the rest of the process lifetime.
    pub async fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        tracing::info!(name = %name, value = %value, "Overriding environment variable");
        self.values.write().await.insert(name, value);
    }
}
