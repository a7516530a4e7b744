//! # cb-config
//!
//! Layered settings: built-in defaults, then `config/board.toml` if present,
//! then `BOARD__SECTION__KEY` environment variables (a `.env` file is read
//! first when one exists).

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub auth: AuthSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// The single origin allowed by CORS (the web client)
    pub cors_origin: String,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// May embed credentials for non-file backends, so it is kept secret.
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `info,cb_services=debug`
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub credential_scheme: CredentialSchemeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialSchemeKind {
    /// Passwords stored as typed. Matches existing member rows.
    LegacyPlaintext,
    Argon2,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplaySettings {
    /// Offset applied when rendering timestamps for clients
    pub utc_offset_hours: i32,
}

impl Settings {
    /// Reads `.env`, `config/board.toml`, and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let settings = Self::defaults()?
            .add_source(File::with_name("config/board").required(false))
            .add_source(
                Environment::with_prefix("BOARD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Listen address in `host:port` form.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000_i64)?
            .set_default("server.cors_origin", "http://localhost:3000")?
            .set_default("database.url", "sqlite:community_board.db")?
            .set_default("database.max_connections", 8_i64)?
            .set_default("logging.filter", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("auth.credential_scheme", "legacy-plaintext")?
            .set_default("display.utc_offset_hours", 9_i64)
    }
}
