use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;

/// Where uploaded campaign images end up. The production implementation
/// writes to local disk under the configured upload directory, which the
/// router serves back statically.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl StorageClient for LocalStorage {
    async fn put_object(&self, key: &str, body: Bytes) -> anyhow::Result<()> {
        let path = self.root.join(key);
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write upload {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_object_writes_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = LocalStorage::new(dir.path());
        storage
            .put_object("abc.png", Bytes::from_static(b"png-bytes"))
            .await
            .expect("put should succeed");
        let stored = std::fs::read(dir.path().join("abc.png")).expect("file exists");
        assert_eq!(stored, b"png-bytes");
    }

    #[tokio::test]
    async fn put_object_fails_when_dir_is_missing() {
        let storage = LocalStorage::new("/nonexistent/fundhive-test-dir");
        let err = storage
            .put_object("abc.png", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("write upload"));
    }
}
