use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of `users` as returned by search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub mobile: String,
    pub nationality: Option<String>,
    pub language: Option<String>,
    pub pin: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

/// A validated submission, ready for insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub age: i32,
    pub mobile: String,
    pub nationality: String,
    pub language: String,
    pub pin: String,
}
