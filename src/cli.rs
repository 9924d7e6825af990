//! CLI definitions using clap.

use std::time::Duration;

use actorfeatures_web::HarnessConfig;
use actorfeatures_web::config::DEFAULT_ACTOR_TYPE;
use clap::Parser;

/// Actor features conformance app
#[derive(Parser, Debug)]
#[command(name = "actorfeatures")]
#[command(version)]
#[command(about = "Hosts a test actor type behind an actor runtime sidecar")]
#[command(
    long_about = "Impersonates a user actor implementation so a test driver can verify activation, deactivation, state transactions, timers and reminders through the sidecar."
)]
pub struct Cli {
    /// Port the app listens on
    #[arg(long, env = "APP_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address the app binds to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Sidecar HTTP port on localhost
    #[arg(long, env = "DAPR_HTTP_PORT", default_value_t = 3500)]
    pub sidecar_port: u16,

    /// Full sidecar API root, overriding --sidecar-port
    #[arg(long)]
    pub sidecar_url: Option<String>,

    /// Simulated work per direct method call, in seconds
    #[arg(long, default_value_t = 5)]
    pub work_delay_secs: u64,

    /// Actor type used when TEST_APP_ACTOR_TYPE is unset
    #[arg(long, default_value = DEFAULT_ACTOR_TYPE)]
    pub actor_type: String,
}

impl Cli {
    /// App configuration for these arguments.
    pub fn harness_config(&self) -> HarnessConfig {
        let sidecar_base_url = self
            .sidecar_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}/v1.0", self.sidecar_port));

        HarnessConfig::default()
            .bind_address(format!("{}:{}", self.host, self.port))
            .sidecar_base_url(sidecar_base_url)
            .default_actor_type(self.actor_type.clone())
            .work_delay(Duration::from_secs(self.work_delay_secs))
    }
}
