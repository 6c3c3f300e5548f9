//! Startup provisioning: create the target database and the `users` table.
//!
//! Safe to run on every start. "Already exists" is success at both steps.

use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

use crate::config::Config;
use crate::db::postgres::{PgPool, connect_options, sqlstate};
use crate::db::schema::{DUPLICATE_DATABASE, USERS_INIT, quote_ident};
use crate::error::SurveyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseOutcome {
    Created,
    AlreadyExisted,
}

/// Provision database and schema on the primary endpoint.
///
/// Every error returned here is fatal for the process.
pub async fn bootstrap(cfg: &Config) -> Result<DatabaseOutcome, SurveyError> {
    let host = cfg.primary_host();
    let db_name = cfg.database_name();

    let admin_opts = connect_options(cfg, host, cfg.bootstrap_database_name())?;
    let admin = single_connection_pool()
        .connect_with(admin_opts)
        .await
        .inspect_err(|e| error!(host, error = %e, "failed to connect to the primary database"))?;
    info!(host, "connected to primary database");

    // DDL goes through the simple query protocol, unprepared.
    let created = sqlx::raw_sql(&create_database_sql(db_name))
        .execute(&admin)
        .await;
    admin.close().await;

    let outcome = classify_create_database(created.map(|_| ()))
        .inspect_err(|e| error!(database = db_name, error = %e, "error creating database"))?;
    match outcome {
        DatabaseOutcome::Created => info!(database = db_name, "database created"),
        DatabaseOutcome::AlreadyExisted => info!(database = db_name, "database already exists"),
    }

    let target_opts = connect_options(cfg, host, db_name)?;
    let target = single_connection_pool()
        .connect_with(target_opts)
        .await
        .inspect_err(|e| {
            error!(database = db_name, error = %e, "failed to connect to target database")
        })?;

    let table = create_users_table(&target).await;
    target.close().await;
    table.inspect_err(|e| error!(error = %e, "error creating table"))?;
    info!("table \"users\" created or already exists");

    Ok(outcome)
}

fn single_connection_pool() -> PgPoolOptions {
    PgPoolOptions::new().max_connections(1)
}

pub fn create_database_sql(db_name: &str) -> String {
    format!("CREATE DATABASE {}", quote_ident(db_name))
}

fn classify_create_database(
    result: Result<(), sqlx::Error>,
) -> Result<DatabaseOutcome, SurveyError> {
    match result {
        Ok(()) => Ok(DatabaseOutcome::Created),
        Err(e) if is_duplicate_database(sqlstate(&e).as_deref()) => {
            Ok(DatabaseOutcome::AlreadyExisted)
        }
        Err(e) => Err(SurveyError::DatabaseError(e)),
    }
}

fn is_duplicate_database(code: Option<&str>) -> bool {
    code == Some(DUPLICATE_DATABASE)
}

async fn create_users_table(pool: &PgPool) -> Result<(), SurveyError> {
    sqlx::raw_sql(USERS_INIT).execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_database_quotes_the_name() {
        assert_eq!(create_database_sql("survey"), r#"CREATE DATABASE "survey""#);
    }

    #[test]
    fn only_duplicate_database_is_tolerated() {
        assert!(is_duplicate_database(Some("42P04")));
        assert!(!is_duplicate_database(Some("42501")));
        assert!(!is_duplicate_database(None));
    }

    #[test]
    fn classify_success_and_other_errors() {
        assert_eq!(
            classify_create_database(Ok(())).unwrap(),
            DatabaseOutcome::Created
        );
        assert!(matches!(
            classify_create_database(Err(sqlx::Error::PoolTimedOut)),
            Err(SurveyError::DatabaseError(_))
        ));
    }
}
