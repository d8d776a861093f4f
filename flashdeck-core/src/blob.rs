use crate::{Blob, CoreError};
use async_trait::async_trait;

/// Where uploaded card files live. Keys are always freshly minted tokens.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), CoreError>;
    fn url_for(&self, key: &str) -> String;
    async fn fetch(&self, key: &str) -> Result<Blob, CoreError>;
}
