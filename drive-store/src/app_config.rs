use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_backend_url() -> String {
    "https://driveeasy.pythonanywhere.com".to_string()
}

fn default_timeout() -> u64 {
    15
}

/// Without a URL the gateway keeps session state in memory.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RedisConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub hold_token_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_soft_hold")]
    pub soft_hold_seconds: u64,
    #[serde(default = "default_catalog_cache")]
    pub catalog_cache_seconds: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: i64,
}

fn default_soft_hold() -> u64 { 3600 }
fn default_catalog_cache() -> u64 { 30 }
fn default_sweep_interval() -> u64 { 30 }
fn default_rate_limit() -> i64 { 120 }

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            soft_hold_seconds: default_soft_hold(),
            catalog_cache_seconds: default_catalog_cache(),
            sweep_interval_seconds: default_sweep_interval(),
            rate_limit_per_minute: default_rate_limit(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Optional per-environment overrides
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `DRIVE_BACKEND__BASE_URL=http://localhost:8000`
            .add_source(config::Environment::with_prefix("DRIVE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let s = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                port = 3000
                [backend]
                [auth]
                hold_token_secret = "s3cret"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let cfg: Config = s.try_deserialize().unwrap();
        assert_eq!(cfg.backend.base_url, "https://driveeasy.pythonanywhere.com");
        assert_eq!(cfg.business_rules.soft_hold_seconds, 3600);
        assert!(cfg.redis.url.is_none());
    }
}
