use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use listkeeper_service::{LocalService, DEFAULT_TIMEOUT};
use listkeeper_store::StoreConfig;

use crate::routes::{build_router, InnerAppState};

/// A router over in-memory SQLite and a fresh temp upload dir.
/// Returns the upload dir so tests can inspect written attachments.
pub async fn test_router() -> (Router, PathBuf) {
    test_router_with_timeout(DEFAULT_TIMEOUT).await
}

pub async fn test_router_with_timeout(timeout: Duration) -> (Router, PathBuf) {
    let db = Arc::new(listkeeper_db::SqliteDatabase::open_in_memory().unwrap());
    let upload_dir = tempfile::tempdir().unwrap().keep();
    let store = listkeeper_store::create_store(&StoreConfig {
        upload_dir: Some(upload_dir.to_string_lossy().to_string()),
    });
    let service = Arc::new(LocalService::new(db, store, timeout));
    let router = build_router(Arc::new(InnerAppState { service }));
    (router, upload_dir)
}
