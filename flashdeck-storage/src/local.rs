use async_trait::async_trait;
use flashdeck_core::{blob_err, is_token, Blob, BlobStore, CoreError};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::task;

pub const DEFAULT_URL_PREFIX: &str = "/uploads/";

/// Uploads kept as plain files named by their key.
pub struct LocalDisk {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalDisk {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        Self::open_with(dir, DEFAULT_URL_PREFIX)
    }

    pub fn open_with(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Result<Self, CoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(blob_err("create upload dir"))?;
        Ok(Self {
            dir,
            url_prefix: url_prefix.into(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CoreError> {
        if !is_token(key) {
            return Err(CoreError::Invalid("blob key"));
        }
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalDisk {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<(), CoreError> {
        let path = self.path_for(key)?;
        let dir = self.dir.clone();
        task::spawn_blocking(move || write_atomic(&dir, &path, &bytes))
            .await
            .map_err(blob_err("io"))?
            .map_err(blob_err("write upload"))?;
        tracing::debug!(key, dir = %self.dir.display(), "stored upload");
        Ok(())
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}{}", self.url_prefix, key)
    }

    async fn fetch(&self, key: &str) -> Result<Blob, CoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Blob {
                bytes,
                content_type: None,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(CoreError::NotFound("blob")),
            Err(e) => Err(blob_err("read upload")(e)),
        }
    }
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}
