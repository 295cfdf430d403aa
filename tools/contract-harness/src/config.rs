//! Contract harness configuration loaded from environment variables.

/// Configuration for the Docker-backed managed mode.
///
/// Read from env vars after `dotenv::dotenv().ok()`; no CLI parsing. Every
/// value has a default suitable for local development.
#[derive(Debug)]
pub struct ContractHarnessConfig {
    /// Docker daemon URL (`DOCKER_HOST`).
    /// default: `"unix:///var/run/docker.sock"`
    pub docker_host: String,
}

impl ContractHarnessConfig {
    pub fn from_env() -> Self {
        Self {
            docker_host: std::env::var("DOCKER_HOST")
                .unwrap_or_else(|_| "unix:///var/run/docker.sock".to_owned()),
        }
    }
}
