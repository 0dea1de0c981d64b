use omm_core::WizardSettings;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub wizard: WizardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Live wizards untouched for this long are unmounted
    #[serde(default = "default_session_idle_seconds")]
    pub session_idle_seconds: u64,
    #[serde(default = "default_session_sweep_seconds")]
    pub session_sweep_seconds: u64,
}

fn default_session_idle_seconds() -> u64 {
    1800
}

fn default_session_sweep_seconds() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `OMM__WIZARD__AVAILABILITY_POLL_SECONDS=10`
            .add_source(config::Environment::with_prefix("OMM").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wizard_section_is_optional() {
        let raw = r#"
            [server]
            port = 8080

            [database]
            url = "postgres://localhost/omm"

            [redis]
            url = "redis://127.0.0.1/"

            [auth]
            jwt_secret = "dev-secret"
            jwt_expiration_seconds = 3600
        "#;

        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.session_idle_seconds, 1800);
        assert_eq!(config.server.session_sweep_seconds, 60);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.wizard.availability_poll_seconds, 30);
        assert_eq!(config.wizard.progress_ttl_hours, 24);
    }
}
