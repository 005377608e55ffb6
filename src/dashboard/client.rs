use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::models::{SheetCollection, UpdateRequest, COLLECTION_VERSION};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Could not reach vendor API: {0}")]
    Transport(String),
    #[error("Vendor API answered HTTP {status}")]
    Status { status: u16, body: Value },
    #[error("Unreadable vendor API response: {0}")]
    Decode(String),
    #[error("Unsupported collection version {0}")]
    UnsupportedVersion(u32),
}

/// What the dashboard needs from the proxy endpoint.
#[async_trait]
pub trait VendorApi: Send + Sync {
    async fn fetch_sheets(&self) -> Result<SheetCollection, ClientError>;

    /// Returns the store acknowledgment on a 2xx answer.
    async fn update_vendor(&self, request: &UpdateRequest) -> Result<Value, ClientError>;
}

pub struct ProxyClient {
    client: Client,
    url: String,
}

impl ProxyClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl VendorApi for ProxyClient {
    async fn fetch_sheets(&self) -> Result<SheetCollection, ClientError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json().await.unwrap_or(Value::Null);
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let collection: SheetCollection = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        if collection.version != COLLECTION_VERSION {
            return Err(ClientError::UnsupportedVersion(collection.version));
        }
        Ok(collection)
    }

    async fn update_vendor(&self, request: &UpdateRequest) -> Result<Value, ClientError> {
        let response = self
            .client
            .patch(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}
