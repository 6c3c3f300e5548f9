use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};
use tracing::debug;

use crate::config::Config;
use crate::db::models::{NewUser, UserRecord};
use crate::db::schema::UNIQUE_VIOLATION;
use crate::db::store::{UserReader, UserWriter};
use crate::error::SurveyError;

pub type PgPool = Pool<Postgres>;

const INSERT_USER: &str = r#"
INSERT INTO "users" (name, age, mobile, nationality, language, pin)
VALUES ($1, $2, $3, $4, $5, $6)
"#;

const FIND_FIRST: &str = r#"
SELECT id, name, age, mobile, nationality, language, pin, created_at
FROM "users"
WHERE name = $1 OR mobile = $1
ORDER BY id ASC
LIMIT 1
"#;

/// Connect options for `host`/`database` with the shared user, port and password.
pub fn connect_options(
    cfg: &Config,
    host: &str,
    database: &str,
) -> Result<PgConnectOptions, SurveyError> {
    let raw_port = cfg.db_port_raw();
    let port = raw_port
        .parse::<u16>()
        .map_err(|_| SurveyError::InvalidSetting {
            name: "DB_PORT",
            value: raw_port.to_string(),
        })?;
    Ok(PgConnectOptions::new()
        .host(host)
        .port(port)
        .username(cfg.user())
        .password(cfg.password())
        .database(database))
}

/// Writable pool on the primary endpoint, target database. Connects lazily.
pub fn primary_pool(cfg: &Config) -> Result<PgPool, SurveyError> {
    let opts = connect_options(cfg, cfg.primary_host(), cfg.database_name())?;
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections()?)
        .connect_lazy_with(opts);
    debug!(host = cfg.primary_host(), "primary pool configured");
    Ok(pool)
}

/// Pool on the read replica. Every session is read-only. Connects lazily.
pub fn replica_pool(cfg: &Config) -> Result<PgPool, SurveyError> {
    let opts = connect_options(cfg, cfg.replica_host(), cfg.database_name())?
        .options([("default_transaction_read_only", "on")]);
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections()?)
        .connect_lazy_with(opts);
    debug!(host = cfg.replica_host(), "replica pool configured");
    Ok(pool)
}

/// SQLSTATE of a database error, if the server reported one.
pub fn sqlstate(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code.into_owned())
}

fn classify_insert_error(err: sqlx::Error) -> SurveyError {
    match sqlstate(&err).as_deref() {
        Some(UNIQUE_VIOLATION) => SurveyError::DuplicateMobile,
        _ => SurveyError::InsertFailed(err),
    }
}

/// `users` access through one pool. The router holds one per endpoint.
#[derive(Clone)]
pub struct UsersStorage {
    pool: PgPool,
}

impl UsersStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserWriter for UsersStorage {
    async fn insert_user(&self, user: &NewUser) -> Result<(), SurveyError> {
        sqlx::query(INSERT_USER)
            .bind(&user.name)
            .bind(user.age)
            .bind(&user.mobile)
            .bind(&user.nationality)
            .bind(&user.language)
            .bind(&user.pin)
            .execute(&self.pool)
            .await
            .map_err(classify_insert_error)?;
        Ok(())
    }
}

#[async_trait]
impl UserReader for UsersStorage {
    async fn find_first(&self, term: &str) -> Result<Option<UserRecord>, SurveyError> {
        sqlx::query_as::<_, UserRecord>(FIND_FIRST)
            .bind(term)
            .fetch_optional(&self.pool)
            .await
            .map_err(SurveyError::SearchFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg_with_port(port: &str) -> Config {
        Config {
            db_password: Some("pw".to_string()),
            db_port: Some(port.to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn bad_port_surfaces_when_building_options() {
        let err = connect_options(&cfg_with_port("54x2"), "db", "survey").unwrap_err();
        assert!(matches!(err, SurveyError::InvalidSetting { name: "DB_PORT", .. }));
    }

    #[test]
    fn options_use_shared_credentials() {
        let opts = connect_options(&cfg_with_port("6432"), "primary", "survey").unwrap();
        assert_eq!(opts.get_host(), "primary");
        assert_eq!(opts.get_port(), 6432);
        assert_eq!(opts.get_username(), "admin");
        assert_eq!(opts.get_database(), Some("survey"));
    }

    #[test]
    fn non_database_errors_are_insert_failures() {
        let err = classify_insert_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, SurveyError::InsertFailed(_)));
        assert_eq!(sqlstate(&sqlx::Error::RowNotFound), None);
    }
}
