//! Object storage access
//!
//! Templates and generated reports live in object storage. The server never
//! holds storage credentials: it asks the pre-signed URL service for a
//! short-lived URL on behalf of the caller's bearer token, then transfers
//! the bytes directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("{operation} returned HTTP {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("Pre-signed URL service returned no URL")]
    MissingUrl,

    #[error("Object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Request(err.to_string())
    }
}

/// Read and write whole objects on behalf of a bearer token
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, bucket: &str, key: &str, token: &str) -> Result<Vec<u8>, StorageError>;

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        token: &str,
    ) -> Result<(), StorageError>;
}

#[derive(Debug, Serialize)]
struct PresignRequest<'a> {
    bucket: &'a str,
    key: &'a str,
    method: &'static str,
    #[serde(rename = "contentType", skip_serializing_if = "Option::is_none")]
    content_type: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PresignResponse {
    #[serde(rename = "presignedUrl")]
    presigned_url: Option<String>,
}

/// Object store backed by a pre-signed URL endpoint
pub struct PresignedUrlStore {
    client: reqwest::Client,
    endpoint: String,
}

impl PresignedUrlStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    async fn presign(
        &self,
        bucket: &str,
        key: &str,
        method: &'static str,
        content_type: Option<&str>,
        token: &str,
    ) -> Result<String, StorageError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&PresignRequest {
                bucket,
                key,
                method,
                content_type,
            })
            .send()
            .await?;

        let response = check_status("presign", response).await?;
        let body: PresignResponse = response.json().await?;
        body.presigned_url
            .filter(|url| !url.is_empty())
            .ok_or(StorageError::MissingUrl)
    }
}

#[async_trait]
impl ObjectStore for PresignedUrlStore {
    async fn get(&self, bucket: &str, key: &str, token: &str) -> Result<Vec<u8>, StorageError> {
        let url = self.presign(bucket, key, "GET", None, token).await?;
        debug!(bucket, key, "downloading object");

        let response = self.client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        let response = check_status("download", response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        token: &str,
    ) -> Result<(), StorageError> {
        let url = self
            .presign(bucket, key, "PUT", Some(content_type), token)
            .await?;
        debug!(bucket, key, size = bytes.len(), "uploading object");

        let response = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        check_status("upload", response).await?;
        Ok(())
    }
}

async fn check_status(
    operation: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Status {
        operation,
        status: status.as_u16(),
        body,
    })
}

/// `s3://bucket/key` location string used in responses
pub fn location(bucket: &str, key: &str) -> String {
    format!("s3://{}/{}", bucket, key)
}
