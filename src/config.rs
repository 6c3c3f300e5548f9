//! Service configuration.
//!
//! Sources, lowest priority first:
//! - built-in defaults (see the `DEFAULT_*` constants)
//! - `config.toml` in the working directory, if present
//! - environment variables (`PRIMARY_DB_HOST`, `DB_PORT`, ...)
//!
//! Blank values are treated as unset and fall back to the default.

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::net::SocketAddr;

use crate::error::SurveyError;

pub const DEFAULT_PRIMARY_DB_HOST: &str = "primary-db-endpoint";
pub const DEFAULT_REPLICA_DB_HOST: &str = "replica-db-endpoint";
pub const DEFAULT_DB_USER: &str = "admin";
pub const DEFAULT_DB_PORT: &str = "5432";
pub const DEFAULT_DB_NAME: &str = "survey";
pub const DEFAULT_BOOTSTRAP_DB_NAME: &str = "postgres";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_HTTP_PORT: &str = "8080";
pub const DEFAULT_LOGLEVEL: &str = "info";

const CONFIG_FILE: &str = "config.toml";

const ENV_KEYS: &[&str] = &[
    "PRIMARY_DB_HOST",
    "REPLICA_DB_HOST",
    "DB_USER",
    "DB_PORT",
    "DB_PASSWORD",
    "DB_NAME",
    "DB_BOOTSTRAP_NAME",
    "DB_MAX_CONNECTIONS",
    "PORT",
    "LOGLEVEL",
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default, deserialize_with = "non_blank")]
    pub primary_db_host: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub replica_db_host: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub db_user: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub db_port: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub db_password: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub db_name: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub db_bootstrap_name: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub db_max_connections: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub port: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub loglevel: Option<String>,
}

impl Config {
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file(CONFIG_FILE))
            .merge(Serialized::defaults(env_settings()))
    }

    /// Load from `config.toml` and the process environment.
    pub fn load() -> Result<Self, SurveyError> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self, SurveyError> {
        let cfg: Config = figment.extract()?;
        if cfg.db_password.is_none() {
            return Err(SurveyError::MissingSetting("DB_PASSWORD"));
        }
        Ok(cfg)
    }

    pub fn primary_host(&self) -> &str {
        self.primary_db_host
            .as_deref()
            .unwrap_or(DEFAULT_PRIMARY_DB_HOST)
    }

    pub fn replica_host(&self) -> &str {
        self.replica_db_host
            .as_deref()
            .unwrap_or(DEFAULT_REPLICA_DB_HOST)
    }

    pub fn user(&self) -> &str {
        self.db_user.as_deref().unwrap_or(DEFAULT_DB_USER)
    }

    /// Raw port value; parsed only when connect options are built.
    pub fn db_port_raw(&self) -> &str {
        self.db_port.as_deref().unwrap_or(DEFAULT_DB_PORT)
    }

    pub fn password(&self) -> &str {
        self.db_password.as_deref().unwrap_or_default()
    }

    pub fn database_name(&self) -> &str {
        self.db_name.as_deref().unwrap_or(DEFAULT_DB_NAME)
    }

    pub fn bootstrap_database_name(&self) -> &str {
        self.db_bootstrap_name
            .as_deref()
            .unwrap_or(DEFAULT_BOOTSTRAP_DB_NAME)
    }

    pub fn max_connections(&self) -> Result<u32, SurveyError> {
        match self.db_max_connections.as_deref() {
            None => Ok(DEFAULT_MAX_CONNECTIONS),
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| SurveyError::InvalidSetting {
                    name: "DB_MAX_CONNECTIONS",
                    value: raw.to_string(),
                }),
        }
    }

    pub fn loglevel(&self) -> &str {
        self.loglevel.as_deref().unwrap_or(DEFAULT_LOGLEVEL)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, SurveyError> {
        let raw = self.port.as_deref().unwrap_or(DEFAULT_HTTP_PORT);
        let port = raw
            .parse::<u16>()
            .map_err(|_| SurveyError::InvalidSetting {
                name: "PORT",
                value: raw.to_string(),
            })?;
        Ok(SocketAddr::from(([0, 0, 0, 0], port)))
    }
}

/// Environment values are passed through untouched, so `0123` stays `0123`.
fn env_settings() -> BTreeMap<String, String> {
    ENV_KEYS
        .iter()
        .filter_map(|key| {
            std::env::var(key)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(|value| (key.to_ascii_lowercase(), value))
        })
        .collect()
}

/// TOML yields numbers for values like `5432`; accept any scalar and keep it
/// as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
}

fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    Ok(raw
        .map(|s| match s {
            Scalar::Text(s) => s,
            Scalar::Int(n) => n.to_string(),
            Scalar::Uint(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        })
        .filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        Jail::expect_with(|jail| {
            jail.set_env("DB_PASSWORD", "secret");
            jail.set_env("PRIMARY_DB_HOST", "   ");
            jail.set_env("DB_NAME", "");

            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.primary_host(), DEFAULT_PRIMARY_DB_HOST);
            assert_eq!(cfg.replica_host(), DEFAULT_REPLICA_DB_HOST);
            assert_eq!(cfg.user(), DEFAULT_DB_USER);
            assert_eq!(cfg.db_port_raw(), DEFAULT_DB_PORT);
            assert_eq!(cfg.database_name(), DEFAULT_DB_NAME);
            assert_eq!(cfg.bootstrap_database_name(), DEFAULT_BOOTSTRAP_DB_NAME);
            assert_eq!(cfg.max_connections().map_err(|e| e.to_string())?, 10);
            assert_eq!(
                cfg.listen_addr().map_err(|e| e.to_string())?,
                SocketAddr::from(([0, 0, 0, 0], 8080))
            );
            Ok(())
        });
    }

    #[test]
    fn env_overrides_and_numeric_values() {
        Jail::expect_with(|jail| {
            jail.set_env("DB_PASSWORD", "1234");
            jail.set_env("DB_PORT", "6543");
            jail.set_env("REPLICA_DB_HOST", "replica.internal");
            jail.set_env("PORT", "9000");

            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.password(), "1234");
            assert_eq!(cfg.db_port_raw(), "6543");
            assert_eq!(cfg.replica_host(), "replica.internal");
            assert_eq!(cfg.listen_addr().map_err(|e| e.to_string())?.port(), 9000);
            Ok(())
        });
    }

    #[test]
    fn env_text_is_kept_verbatim() {
        Jail::expect_with(|jail| {
            jail.set_env("DB_PASSWORD", "0123");
            jail.set_env("DB_USER", "1.50");
            jail.set_env("DB_NAME", "[secret]");
            jail.set_env("DB_BOOTSTRAP_NAME", " template1 ");

            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.password(), "0123");
            assert_eq!(cfg.user(), "1.50");
            assert_eq!(cfg.database_name(), "[secret]");
            assert_eq!(cfg.bootstrap_database_name(), " template1 ");
            Ok(())
        });
    }

    #[test]
    fn toml_file_is_overridden_by_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                db_password = "from-file"
                db_name = "from_file"
                db_port = 5433
                "#,
            )?;
            jail.set_env("DB_NAME", "from_env");
            jail.set_env("DB_PORT", "");

            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.password(), "from-file");
            assert_eq!(cfg.database_name(), "from_env");
            assert_eq!(cfg.db_port_raw(), "5433");
            Ok(())
        });
    }

    #[test]
    fn missing_password_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", r#"db_name = "survey""#)?;
            let err = Config::from_figment(Figment::new().merge(Toml::file(CONFIG_FILE)))
                .expect_err("password is required");
            assert!(matches!(err, SurveyError::MissingSetting("DB_PASSWORD")));
            Ok(())
        });
    }

    #[test]
    fn port_shape_is_not_checked_at_load() {
        Jail::expect_with(|jail| {
            jail.set_env("DB_PASSWORD", "x");
            jail.set_env("DB_PORT", "not-a-port");
            jail.set_env("DB_MAX_CONNECTIONS", "0");

            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.db_port_raw(), "not-a-port");
            assert!(cfg.max_connections().is_err());
            Ok(())
        });
    }
}
