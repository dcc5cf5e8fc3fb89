//! StoreClient — thin wrapper over the object store SDK.
//!
//! One client is built at startup and cloned into every request path;
//! the SDK client is cheap to clone and pools connections internally.
//! Credentials and region come from the ambient provider chain
//! (environment, profile, instance metadata) and are never passed
//! explicitly. All operations act on a single configured bucket.

use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::{Credentials, provider::ProvideCredentials};
use aws_sdk_s3::{
    Client,
    error::{DisplayErrorContext, ProvideErrorMetadata},
    presigning::PresigningConfig,
    primitives::ByteStream,
};
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid object key")]
    InvalidKey,
    #[error("continuation token rejected by the store")]
    InvalidCursor,
    #[error("store credentials unavailable: {0}")]
    Credentials(String),
    #[error("store region is not configured")]
    MissingRegion,
    #[error("{0}")]
    Upstream(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A raw object row from one list page, SDK types already erased.
#[derive(Debug, Clone)]
pub struct RawObject {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// One unshaped page from ListObjectsV2 with delimiter grouping applied
/// by the store. The continuation token is passed through untouched.
#[derive(Debug, Clone, Default)]
pub struct RawPage {
    pub objects: Vec<RawObject>,
    pub common_prefixes: Vec<String>,
    pub next_cursor: Option<String>,
}

const MAX_OBJECT_KEY_LEN: usize = 1024;

/// Shared, process-wide store client bound to one bucket.
#[derive(Clone)]
pub struct StoreClient {
    client: Client,
    sdk_config: SdkConfig,
    bucket: String,
    endpoint_url: Option<String>,
}

impl StoreClient {
    /// Build a client from ambient configuration. An explicit endpoint
    /// URL switches to path-style addressing for S3-compatible stores.
    pub async fn from_env(bucket: String, endpoint_url: Option<String>) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        let client = match &endpoint_url {
            Some(endpoint) => {
                let conf = aws_sdk_s3::config::Builder::from(&sdk_config)
                    .endpoint_url(endpoint)
                    .force_path_style(true)
                    .build();
                Client::from_conf(conf)
            }
            None => Client::new(&sdk_config),
        };
        Self {
            client,
            sdk_config,
            bucket,
            endpoint_url,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Basic key validation to reject trivially malformed input before
    /// it reaches the store.
    pub fn ensure_key_safe(key: &str) -> StoreResult<()> {
        if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
            return Err(StoreError::InvalidKey);
        }
        if key.starts_with('/') || key.contains("..") {
            return Err(StoreError::InvalidKey);
        }
        if key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(StoreError::InvalidKey);
        }
        Ok(())
    }

    /// Fetch one page of keys under `prefix`, grouped by the `/`
    /// delimiter. A rejected continuation token maps to
    /// `StoreError::InvalidCursor` so callers can restart cleanly.
    pub async fn list_page(&self, prefix: &str, cursor: Option<&str>) -> StoreResult<RawPage> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .delimiter("/");
        if let Some(token) = cursor {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(|err| {
            if cursor.is_some() && err.code() == Some("InvalidArgument") {
                StoreError::InvalidCursor
            } else {
                upstream(&err)
            }
        })?;

        let objects = response
            .contents()
            .iter()
            .filter_map(|obj| {
                let key = obj.key()?.to_string();
                Some(RawObject {
                    key,
                    size: obj.size().unwrap_or(0),
                    last_modified: obj
                        .last_modified()
                        .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())),
                })
            })
            .collect();

        let common_prefixes = response
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(|s| s.to_string()))
            .collect();

        Ok(RawPage {
            objects,
            common_prefixes,
            next_cursor: response.next_continuation_token().map(|s| s.to_string()),
        })
    }

    /// Write a zero-byte object at `key`. Put-is-upsert: re-writing an
    /// existing marker succeeds.
    pub async fn put_marker(&self, key: &str) -> StoreResult<()> {
        Self::ensure_key_safe(key)?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from_static(b""))
            .send()
            .await
            .map_err(|err| upstream(&err))?;
        Ok(())
    }

    /// Delete `key` unconditionally. The store treats deleting an
    /// absent key as success, and so does this call.
    pub async fn delete(&self, key: &str) -> StoreResult<()> {
        Self::ensure_key_safe(key)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| upstream(&err))?;
        Ok(())
    }

    /// Presign a GET for `key`. No existence check: a URL for a missing
    /// key fails at use time with the store's own not-found.
    pub async fn presign_get(&self, key: &str, ttl: Duration) -> StoreResult<String> {
        Self::ensure_key_safe(key)?;
        let presigning = PresigningConfig::builder()
            .expires_in(ttl)
            .build()
            .map_err(|err| StoreError::Upstream(err.to_string()))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|err| upstream(&err))?;
        Ok(request.uri().to_string())
    }

    /// Connectivity probe against the configured bucket.
    pub async fn head_bucket(&self) -> StoreResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|err| upstream(&err))?;
        Ok(())
    }

    /// Resolve the ambient credentials for request signing done outside
    /// the SDK (POST policies).
    pub async fn signing_credentials(&self) -> StoreResult<Credentials> {
        let provider = self
            .sdk_config
            .credentials_provider()
            .ok_or_else(|| StoreError::Credentials("no credentials provider".into()))?;
        provider
            .provide_credentials()
            .await
            .map_err(|err| StoreError::Credentials(err.to_string()))
    }

    pub fn region(&self) -> StoreResult<String> {
        self.sdk_config
            .region()
            .map(|r| r.to_string())
            .ok_or(StoreError::MissingRegion)
    }

    /// Endpoint the browser submits its upload form POST to:
    /// path-style against a custom endpoint, virtual-hosted otherwise.
    pub fn upload_url(&self) -> StoreResult<String> {
        match &self.endpoint_url {
            Some(endpoint) => Ok(format!(
                "{}/{}",
                endpoint.trim_end_matches('/'),
                self.bucket
            )),
            None => Ok(format!(
                "https://{}.s3.{}.amazonaws.com",
                self.bucket,
                self.region()?
            )),
        }
    }
}

fn upstream<E: std::error::Error>(err: &E) -> StoreError {
    StoreError::Upstream(DisplayErrorContext(err).to_string())
}
