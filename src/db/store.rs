use async_trait::async_trait;

use crate::db::models::{NewUser, UserRecord};
use crate::error::SurveyError;

/// Write side of `users`, backed by the primary pool.
#[async_trait]
pub trait UserWriter: Send + Sync {
    /// Insert one row. A taken mobile number is [`SurveyError::DuplicateMobile`].
    async fn insert_user(&self, user: &NewUser) -> Result<(), SurveyError>;
}

/// Read side of `users`, backed by the replica pool.
#[async_trait]
pub trait UserReader: Send + Sync {
    /// First row whose name or mobile equals `term`, lowest id first.
    async fn find_first(&self, term: &str) -> Result<Option<UserRecord>, SurveyError>;
}
