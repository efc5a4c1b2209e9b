//! Filename assignment for uploaded attachments.
//!
//! Only the extension is checked; the bytes are handed to the object store
//! as-is under the assigned name.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use listkeeper_store::{ObjectStore, StoreError};
use thiserror::Error;
use tracing::debug;

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "txt"];

/// An uploaded file as received by the transport.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Name the client gave the file; only its extension is used.
    pub file_name: String,
    pub data: Bytes,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("file {0:?} has no extension; allowed: pdf, txt")]
    MissingExtension(String),

    #[error("file type {0:?} is not allowed; allowed: pdf, txt")]
    UnsupportedExtension(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct AttachmentResolver {
    store: Arc<dyn ObjectStore>,
    /// Last issued timestamp (UTC microseconds); generated names never repeat.
    last_stamp: AtomicI64,
}

impl AttachmentResolver {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            last_stamp: AtomicI64::new(0),
        }
    }

    /// Validate `upload`, pick its final filename and write its bytes.
    ///
    /// The base name comes from `preferred_name` when that already carries an
    /// extension (so a replacement keeps its predecessor's name); otherwise a
    /// timestamp is generated.
    pub async fn resolve(
        &self,
        upload: &Upload,
        preferred_name: Option<&str>,
    ) -> Result<String, AttachmentError> {
        let extension = allowed_extension(&upload.file_name)?;
        let base = match preferred_name.and_then(preferred_base) {
            Some(base) => base.to_string(),
            None => self.next_stamp(),
        };
        let file_name = format!("{base}.{extension}");

        self.store.put(&file_name, upload.data.clone()).await?;
        debug!(
            original = %upload.file_name,
            stored = %file_name,
            bytes = upload.data.len(),
            "stored attachment"
        );
        Ok(file_name)
    }

    fn next_stamp(&self) -> String {
        let now = Utc::now().timestamp_micros();
        let mut last = self.last_stamp.load(Ordering::Acquire);
        let issued = loop {
            let candidate = now.max(last + 1);
            match self.last_stamp.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break candidate,
                Err(actual) => last = actual,
            }
        };
        format_stamp(issued)
    }
}

/// Extension after the last dot, if it is in the allow-set.
pub fn allowed_extension(file_name: &str) -> Result<&str, AttachmentError> {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if ALLOWED_EXTENSIONS.contains(&ext) => Ok(ext),
        Some((_, ext)) if !ext.is_empty() => {
            Err(AttachmentError::UnsupportedExtension(ext.to_string()))
        }
        _ => Err(AttachmentError::MissingExtension(file_name.to_string())),
    }
}

/// Portion before the first dot, for names that have one.
fn preferred_base(name: &str) -> Option<&str> {
    name.split_once('.')
        .map(|(base, _)| base)
        .filter(|base| !base.is_empty())
}

fn format_stamp(micros: i64) -> String {
    let at: DateTime<Utc> = DateTime::from_timestamp_micros(micros).unwrap_or_default();
    at.format("%Y%m%d%H%M%S_%6f").to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use listkeeper_store::{LocalStore, StoreConfig};

    use super::*;

    fn resolver(dir: &std::path::Path) -> (AttachmentResolver, Arc<dyn ObjectStore>) {
        let store: Arc<dyn ObjectStore> = Arc::new(LocalStore::new(&StoreConfig {
            upload_dir: Some(dir.to_string_lossy().to_string()),
        }));
        (AttachmentResolver::new(store.clone()), store)
    }

    #[test]
    fn extension_allow_set() {
        assert_eq!(allowed_extension("report.pdf").unwrap(), "pdf");
        assert_eq!(allowed_extension("notes.v2.txt").unwrap(), "txt");
        assert!(matches!(
            allowed_extension("setup.exe"),
            Err(AttachmentError::UnsupportedExtension(ext)) if ext == "exe"
        ));
        assert!(matches!(
            allowed_extension("report.PDF"),
            Err(AttachmentError::UnsupportedExtension(_))
        ));
        assert!(matches!(
            allowed_extension("README"),
            Err(AttachmentError::MissingExtension(_))
        ));
        assert!(matches!(
            allowed_extension("trailing."),
            Err(AttachmentError::MissingExtension(_))
        ));
    }

    #[test]
    fn preferred_base_requires_an_extension() {
        assert_eq!(preferred_base("20240101120000_5.txt"), Some("20240101120000_5"));
        assert_eq!(preferred_base("a.b.pdf"), Some("a"));
        assert_eq!(preferred_base("plain"), None);
        assert_eq!(preferred_base(".hidden"), None);
    }

    #[test]
    fn stamp_format() {
        // 2024-03-05 06:07:08.000042 UTC
        let micros = 1_709_618_828_000_042;
        assert_eq!(format_stamp(micros), "20240305060708_000042");
    }

    #[tokio::test]
    async fn pdf_upload_gets_generated_name() {
        let tmp = tempfile::tempdir().unwrap();
        let (resolver, store) = resolver(tmp.path());

        let name = resolver
            .resolve(&Upload::new("report.pdf", "%PDF-1.4"), None)
            .await
            .unwrap();
        assert!(name.ends_with(".pdf"));
        assert_ne!(name, "report.pdf");
        assert_eq!(store.get(&name).await.unwrap().as_ref(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn preferred_name_base_is_reused() {
        let tmp = tempfile::tempdir().unwrap();
        let (resolver, store) = resolver(tmp.path());

        let name = resolver
            .resolve(
                &Upload::new("scan.pdf", "new"),
                Some("20240101120000_000001.txt"),
            )
            .await
            .unwrap();
        assert_eq!(name, "20240101120000_000001.pdf");
        assert!(store.exists(&name).await.unwrap());

        // Without an extension the preferred name is ignored.
        let name = resolver
            .resolve(&Upload::new("scan.txt", "new"), Some("plain"))
            .await
            .unwrap();
        assert!(name.ends_with(".txt"));
        assert!(!name.starts_with("plain"));
    }

    #[tokio::test]
    async fn rejected_upload_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let (resolver, _store) = resolver(tmp.path());

        let err = resolver
            .resolve(&Upload::new("virus.exe", "MZ"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AttachmentError::UnsupportedExtension(_)));
        assert!(!tmp.path().exists() || std::fs::read_dir(tmp.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn generated_names_do_not_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let (resolver, _store) = resolver(tmp.path());

        let mut names = HashSet::new();
        for _ in 0..50 {
            let name = resolver
                .resolve(&Upload::new("n.txt", "x"), None)
                .await
                .unwrap();
            assert!(names.insert(name), "duplicate generated name");
        }
    }
}
