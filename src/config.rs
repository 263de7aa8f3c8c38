use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_max_lifetime_secs: u64,
    pub db_idle_timeout_secs: u64,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub device_name: String,
    pub body_limit_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://sekolah.db".to_string(),
            jwt_secret: String::new(),
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            db_max_connections: 500,
            db_min_connections: 10,
            db_max_lifetime_secs: 5,
            db_idle_timeout_secs: 2,
            token_ttl_hours: 24,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            device_name: default_device_name(),
            body_limit_bytes: 2 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Read settings from the process environment (after any dotenv file has
    /// been applied) and validate them.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::Invalid(
                "db_max_connections must be at least 1".to_string(),
            ));
        }
        if self.db_min_connections > self.db_max_connections {
            return Err(ConfigError::Invalid(format!(
                "db_min_connections ({}) exceeds db_max_connections ({})",
                self.db_min_connections, self.db_max_connections
            )));
        }
        if self.token_ttl_hours <= 0 {
            return Err(ConfigError::Invalid(
                "token_ttl_hours must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load the dotenv file for `APP_ENV`, falling back to `.env`, then to the
/// bare process environment. Returns the file that was applied, if any.
pub fn load_env_files() -> Option<String> {
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
    let env_file = env_file_for(&app_env);

    if dotenvy::from_path(Path::new(&env_file)).is_ok() {
        info!("Loaded environment from {}", env_file);
        return Some(env_file);
    }

    warn!("{} not found, trying .env", env_file);
    if dotenvy::from_path(Path::new(".env")).is_ok() {
        info!("Loaded environment from .env");
        return Some(".env".to_string());
    }

    warn!("No .env file found, using the process environment");
    None
}

fn env_file_for(app_env: &str) -> String {
    if app_env == "development" {
        ".dev.env".to_string()
    } else {
        format!(".{}.env", app_env)
    }
}

fn default_device_name() -> String {
    env::var("HOSTNAME")
        .or_else(|_| env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
