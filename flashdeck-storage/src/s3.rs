use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client as S3Client,
};
use flashdeck_core::{blob_err, is_token, Blob, BlobStore, CoreError};

/// Explicit key material. When either half of the key pair is missing the
/// ambient AWS credential chain is used instead.
#[derive(Clone, Debug, Default)]
pub struct S3Credentials {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

impl S3Credentials {
    fn explicit(&self) -> Option<Credentials> {
        let key = self.access_key_id.clone().filter(|s| !s.is_empty())?;
        let secret = self.secret_access_key.clone().filter(|s| !s.is_empty())?;
        let token = self.session_token.clone().filter(|s| !s.is_empty());
        Some(Credentials::new(key, secret, token, None, "flashdeck-env"))
    }
}

pub struct S3Store {
    client: S3Client,
    bucket: String,
    region: String,
}

impl S3Store {
    pub async fn new(region: &str, bucket: &str, creds: &S3Credentials) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()));
        if let Some(c) = creds.explicit() {
            loader = loader.credentials_provider(c);
        }
        let conf = loader.load().await;
        tracing::info!(bucket, region, "using s3 upload bucket");
        Self {
            client: S3Client::new(&conf),
            bucket: bucket.to_string(),
            region: region.to_string(),
        }
    }
}

pub fn public_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{bucket}.s3.{region}.amazonaws.com/{key}")
}

#[async_trait]
impl BlobStore for S3Store {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), CoreError> {
        if !is_token(key) {
            return Err(CoreError::Invalid("blob key"));
        }
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(blob_err("s3 put object"))?;
        tracing::debug!(key, bucket = %self.bucket, "stored upload");
        Ok(())
    }

    fn url_for(&self, key: &str) -> String {
        public_url(&self.bucket, &self.region, key)
    }

    async fn fetch(&self, key: &str) -> Result<Blob, CoreError> {
        if !is_token(key) {
            return Err(CoreError::Invalid("blob key"));
        }
        let out = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(out) => out,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => {
                return Err(CoreError::NotFound("blob"));
            }
            Err(e) => return Err(blob_err("s3 get object")(e)),
        };
        let content_type = out.content_type().map(str::to_string);
        let bytes = out
            .body
            .collect()
            .await
            .map_err(blob_err("s3 read body"))?
            .into_bytes()
            .to_vec();
        Ok(Blob {
            bytes,
            content_type,
        })
    }
}
