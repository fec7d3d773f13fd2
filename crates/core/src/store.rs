use crate::error::IngestError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Byte-level access to source files, artifacts and the index.
#[async_trait]
pub trait ByteStore: Send + Sync {
    /// Returns `None` when nothing exists at `path`.
    async fn get(&self, path: &Path) -> Result<Option<Vec<u8>>, IngestError>;

    async fn put(&self, path: &Path, bytes: &[u8]) -> Result<(), IngestError>;
}

/// Local filesystem store. Writes land in a sibling temp file first and are
/// renamed into place, so readers never see a half-written index.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStore;

#[async_trait]
impl ByteStore for LocalStore {
    async fn get(&self, path: &Path) -> Result<Option<Vec<u8>>, IngestError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn put(&self, path: &Path, bytes: &[u8]) -> Result<(), IngestError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let staging = staging_path(path);
        fs::write(&staging, bytes).await?;
        if let Err(error) = fs::rename(&staging, path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(error.into());
        }
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("out"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_reads_as_none() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let bytes = LocalStore.get(&dir.path().join("absent.json")).await?;
        assert!(bytes.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn put_creates_parents_and_replaces_content() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let target = dir.path().join("nested/deeper/index.json");

        LocalStore.put(&target, b"first").await?;
        LocalStore.put(&target, b"second").await?;

        assert_eq!(LocalStore.get(&target).await?, Some(b"second".to_vec()));
        assert!(!dir.path().join("nested/deeper/index.json.tmp").exists());
        Ok(())
    }

    #[tokio::test]
    async fn put_onto_a_directory_fails() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let target = dir.path().join("occupied");
        std::fs::create_dir(&target)?;

        assert!(LocalStore.put(&target, b"data").await.is_err());
        assert!(!dir.path().join("occupied.tmp").exists());
        Ok(())
    }
}
