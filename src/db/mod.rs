//! Database module: models, schema and PostgreSQL storage.
//!
//! Layout:
//! - `models.rs`: row and insert structs
//! - `schema.rs`: DDL, SQLSTATE codes and column widths
//! - `store.rs`: read/write traits the handlers depend on
//! - `postgres.rs`: pool builders and the sqlx-backed store

pub mod models;
pub mod postgres;
pub mod schema;
pub mod store;

pub use models::{NewUser, UserRecord};
pub use postgres::{PgPool, UsersStorage};
pub use schema::USERS_INIT;
pub use store::{UserReader, UserWriter};
