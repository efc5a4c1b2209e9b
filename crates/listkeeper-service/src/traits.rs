use async_trait::async_trait;
use listkeeper_core::{CreateList, List, UpdateList, ValidationError};
use listkeeper_db::DbError;
use thiserror::Error;
use tracing::warn;

use crate::attachment::{AttachmentError, Upload};

/// The complete set of outcomes a caller can see. Every lower-level failure
/// is converted into exactly one of these.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    BadParamInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(msg) => ServiceError::NotFound(msg),
            // Storage refused the write (e.g. a parent that still has sublists).
            DbError::Constraint(msg) => {
                warn!(%msg, "storage constraint refused the write");
                ServiceError::Internal(format!("storage refused the write: {msg}"))
            }
            DbError::Timeout(budget) => {
                warn!(?budget, "storage call gave up at its deadline");
                ServiceError::Internal(format!("storage timed out after {budget:?}"))
            }
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(e: ValidationError) -> Self {
        ServiceError::BadParamInput(e.to_string())
    }
}

impl From<AttachmentError> for ServiceError {
    fn from(e: AttachmentError) -> Self {
        match e {
            AttachmentError::Store(inner) => ServiceError::Internal(inner.to_string()),
            rejected => ServiceError::BadParamInput(rejected.to_string()),
        }
    }
}

/// List and sublist operations, each bounded by one deadline.
///
/// The HTTP layer programs against this trait; `LocalService` implements it
/// on top of a `Database` and an `ObjectStore`.
#[async_trait]
pub trait ListService: Send + Sync {
    // -- Lists --
    async fn fetch(&self) -> Result<Vec<List>, ServiceError>;
    async fn get_by_id(&self, id: i64) -> Result<List, ServiceError>;
    async fn store(
        &self,
        input: CreateList,
        upload: Option<Upload>,
    ) -> Result<List, ServiceError>;
    async fn update(
        &self,
        id: i64,
        update: UpdateList,
        upload: Option<Upload>,
    ) -> Result<List, ServiceError>;
    async fn delete(&self, id: i64) -> Result<(), ServiceError>;

    // -- Sublists --
    async fn fetch_sublist(&self, parent_id: i64) -> Result<Vec<List>, ServiceError>;
    async fn get_sublist_by_id(&self, parent_id: i64, id: i64) -> Result<List, ServiceError>;
    async fn store_sublist(
        &self,
        parent_id: i64,
        input: CreateList,
        upload: Option<Upload>,
    ) -> Result<List, ServiceError>;
    async fn update_sublist(
        &self,
        parent_id: i64,
        id: i64,
        update: UpdateList,
        upload: Option<Upload>,
    ) -> Result<List, ServiceError>;
    async fn delete_sublist(&self, parent_id: i64, id: i64) -> Result<(), ServiceError>;
}
