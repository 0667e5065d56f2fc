use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::{env, fs, io};

// Runtime settings: optional TOML file, then environment overrides.

pub const CONFIG_PATH_VAR: &str = "FERRETERIA_CONFIG";

const DEFAULT_HTTP_PORT: u16 = 3000;
const DEFAULT_SESSION_TTL_SECONDS: u64 = 60 * 60;

/// Deployment environment. Anything other than `development` is treated as
/// production, so diagnostics stay hidden unless explicitly enabled.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("development") {
            Self::Development
        } else {
            Self::Production
        }
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub bind_addr: IpAddr,
    pub http_port: u16,
    pub database_url: Option<String>,
    pub session_ttl_seconds: u64,
    pub admin_username: String,
    pub admin_email: String,
    pub admin_password: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            http_port: DEFAULT_HTTP_PORT,
            database_url: None,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            admin_username: "admin".to_string(),
            admin_email: "admin@ferreteria.local".to_string(),
            admin_password: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl From<ConfigError> for io::Error {
    fn from(err: ConfigError) -> Self {
        io::Error::other(err)
    }
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    // Env values win over the file. Unparseable numbers keep the current value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("APP_ENV") {
            self.environment = Environment::parse(&raw);
        }
        if let Some(raw) = lookup("BIND_ADDR") {
            match raw.trim().parse() {
                Ok(addr) => self.bind_addr = addr,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid BIND_ADDR"),
            }
        }
        if let Some(raw) = lookup("HTTP_PORT") {
            match raw.trim().parse() {
                Ok(port) => self.http_port = port,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid HTTP_PORT"),
            }
        }
        if let Some(raw) = lookup("SESSION_TTL_SECONDS") {
            match raw.trim().parse::<u64>() {
                Ok(ttl) if ttl > 0 => self.session_ttl_seconds = ttl,
                _ => tracing::warn!(value = %raw, "ignoring invalid SESSION_TTL_SECONDS"),
            }
        }
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(username) = lookup("ADMIN_USERNAME") {
            self.admin_username = username;
        }
        if let Some(email) = lookup("ADMIN_EMAIL") {
            self.admin_email = email;
        }
        if let Some(password) = lookup("ADMIN_PASSWORD").filter(|p| !p.is_empty()) {
            self.admin_password = Some(password);
        }
    }
}

// Expects `.env` to be loaded already, see `server::run_with_config`.
pub fn load() -> Result<AppConfig, ConfigError> {
    let mut config = match env::var(CONFIG_PATH_VAR) {
        Ok(path) => {
            let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            AppConfig::from_toml_str(&raw).map_err(|source| ConfigError::Parse { path, source })?
        }
        Err(_) => AppConfig::default(),
    };

    config.apply_overrides(|key| env::var(key).ok());
    Ok(config)
}
