//! The remote directory service seam.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{UserFields, UserId, UserRecord};

/// Any failure of a directory call.
///
/// Timeouts, refused connections, non-2xx statuses and undecodable bodies all collapse into
/// this one condition; callers only ever surface `message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DirectoryError {
    pub message: String,
}

impl DirectoryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// CRUD operations over directory users.
#[async_trait]
pub trait DirectoryService: Send + Sync + 'static {
    /// Users matching `filter` in service order. An empty filter lists everyone.
    async fn list(&self, filter: &str) -> DirectoryResult<Vec<UserRecord>>;

    async fn update(&self, id: UserId, fields: &UserFields) -> DirectoryResult<UserRecord>;

    async fn delete(&self, id: UserId) -> DirectoryResult<()>;

    async fn create(&self, fields: &UserFields) -> DirectoryResult<UserRecord>;
}
