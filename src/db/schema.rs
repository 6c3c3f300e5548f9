//! SQL DDL for the survey database.

/// SQLSTATE raised by `CREATE DATABASE` when the database already exists.
pub const DUPLICATE_DATABASE: &str = "42P04";

/// SQLSTATE for a unique constraint violation (`users.mobile`).
pub const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL schema for `users`:
/// - `id` SERIAL PRIMARY KEY, assigned by the database
/// - `mobile` UNIQUE, the natural lookup key next to `name`
/// - `created_at` defaults to insertion time and is never written by the service
pub const USERS_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS "users" (
    id SERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    age INT NOT NULL,
    mobile VARCHAR(15) NOT NULL UNIQUE,
    nationality VARCHAR(50),
    language VARCHAR(50),
    pin VARCHAR(10),
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Column widths of the `VARCHAR` columns in [`USERS_INIT`].
pub const NAME_MAX_LEN: usize = 100;
pub const MOBILE_MAX_LEN: usize = 15;
pub const NATIONALITY_MAX_LEN: usize = 50;
pub const LANGUAGE_MAX_LEN: usize = 50;
pub const PIN_MAX_LEN: usize = 10;

/// Quote an SQL identifier. `CREATE DATABASE` cannot take a bind parameter.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
