use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use listkeeper_core::validation::{validate_create, validate_update};
use listkeeper_core::{CreateList, Deadline, List, UpdateList};
use listkeeper_db::{Database, DbError};
use listkeeper_store::ObjectStore;
use tracing::warn;

use crate::attachment::{AttachmentResolver, Upload};
use crate::{ListService, ServiceError};

/// Default per-operation budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Service backed by a direct `Database` handle.
///
/// Each operation gets one `Deadline` covering every storage call and
/// attachment write it makes. Nothing is retried.
pub struct LocalService {
    db: Arc<dyn Database>,
    attachments: AttachmentResolver,
    timeout: Duration,
}

impl LocalService {
    pub fn new(db: Arc<dyn Database>, store: Arc<dyn ObjectStore>, timeout: Duration) -> Self {
        Self {
            db,
            attachments: AttachmentResolver::new(store),
            timeout,
        }
    }

    async fn bounded<T, F, Fut>(&self, op: &'static str, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(Deadline) -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let deadline = Deadline::after(self.timeout);
        match tokio::time::timeout_at(deadline.expires_at(), f(deadline)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(op, timeout = ?self.timeout, "operation timed out");
                Err(ServiceError::Internal(format!(
                    "{op} timed out after {:?}",
                    self.timeout
                )))
            }
        }
    }

    async fn insert(
        &self,
        deadline: &Deadline,
        mut input: CreateList,
        upload: Option<Upload>,
    ) -> Result<List, ServiceError> {
        if let Some(upload) = upload {
            input.attachment = Some(self.attachments.resolve(&upload, None).await?);
        }
        Ok(self.db.store(deadline, &input).await?)
    }

    /// Write `update` onto `existing`, whose presence the caller has just
    /// confirmed under the same deadline.
    async fn apply_update(
        &self,
        deadline: &Deadline,
        existing: List,
        mut update: UpdateList,
        upload: Option<Upload>,
    ) -> Result<List, ServiceError> {
        if let Some(upload) = upload {
            let name = self
                .attachments
                .resolve(&upload, existing.attachment.as_deref())
                .await?;
            update.attachment = Some(name);
        }
        match self.db.update(deadline, existing.id, &update).await {
            Ok(list) => Ok(list),
            // Confirmed a moment ago, gone now: a concurrent delete won.
            Err(DbError::NotFound(_)) => Err(ServiceError::Conflict(format!(
                "list {} was removed while being updated",
                existing.id
            ))),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ListService for LocalService {
    async fn fetch(&self) -> Result<Vec<List>, ServiceError> {
        self.bounded("fetch", |deadline| async move {
            Ok(self.db.fetch_top_level(&deadline).await?)
        })
        .await
    }

    async fn get_by_id(&self, id: i64) -> Result<List, ServiceError> {
        self.bounded("get_by_id", |deadline| async move {
            Ok(self.db.get_by_id(&deadline, id).await?)
        })
        .await
    }

    async fn store(
        &self,
        input: CreateList,
        upload: Option<Upload>,
    ) -> Result<List, ServiceError> {
        if let Some(parent_id) = input.parent_id {
            return self.store_sublist(parent_id, input, upload).await;
        }
        validate_create(&input)?;
        self.bounded("store", |deadline| async move {
            self.insert(&deadline, input, upload).await
        })
        .await
    }

    async fn update(
        &self,
        id: i64,
        update: UpdateList,
        upload: Option<Upload>,
    ) -> Result<List, ServiceError> {
        validate_update(&update)?;
        self.bounded("update", |deadline| async move {
            let existing = self.db.get_by_id(&deadline, id).await?;
            self.apply_update(&deadline, existing, update, upload).await
        })
        .await
    }

    async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.bounded("delete", |deadline| async move {
            Ok(self.db.delete(&deadline, id).await?)
        })
        .await
    }

    async fn fetch_sublist(&self, parent_id: i64) -> Result<Vec<List>, ServiceError> {
        self.bounded("fetch_sublist", |deadline| async move {
            Ok(self.db.fetch_children(&deadline, parent_id).await?)
        })
        .await
    }

    async fn get_sublist_by_id(&self, parent_id: i64, id: i64) -> Result<List, ServiceError> {
        self.bounded("get_sublist_by_id", |deadline| async move {
            Ok(self.db.get_child(&deadline, parent_id, id).await?)
        })
        .await
    }

    async fn store_sublist(
        &self,
        parent_id: i64,
        mut input: CreateList,
        upload: Option<Upload>,
    ) -> Result<List, ServiceError> {
        if input.parent_id.is_some_and(|p| p != parent_id) {
            return Err(ServiceError::BadParamInput(format!(
                "parent_id does not match list {parent_id}"
            )));
        }
        validate_create(&input)?;
        self.bounded("store_sublist", |deadline| async move {
            let parent = self.db.get_by_id(&deadline, parent_id).await?;
            if !parent.is_top_level() {
                return Err(ServiceError::BadParamInput(format!(
                    "list {parent_id} is itself a sublist; lists nest one level deep"
                )));
            }
            input.parent_id = Some(parent.id);
            self.insert(&deadline, input, upload).await
        })
        .await
    }

    async fn update_sublist(
        &self,
        parent_id: i64,
        id: i64,
        update: UpdateList,
        upload: Option<Upload>,
    ) -> Result<List, ServiceError> {
        validate_update(&update)?;
        self.bounded("update_sublist", |deadline| async move {
            let existing = self.db.get_child(&deadline, parent_id, id).await?;
            self.apply_update(&deadline, existing, update, upload).await
        })
        .await
    }

    async fn delete_sublist(&self, parent_id: i64, id: i64) -> Result<(), ServiceError> {
        self.bounded("delete_sublist", |deadline| async move {
            Ok(self.db.delete_child(&deadline, parent_id, id).await?)
        })
        .await
    }
}
