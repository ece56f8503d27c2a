//! Pinata-backed ContentStore.
//!
//! Publishing uploads the blob as a multipart file to the Pinata pinning API;
//! resolving fetches `https://{gateway}/ipfs/{cid}` from a public IPFS
//! gateway. Both endpoints are configurable so the store works against any
//! service speaking the same protocol (or a test double).

use std::time::Duration;

use aemula_core::ContentAddress;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, multipart, Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{PublishError, ResolveError, Result, StoreError};
use crate::traits::{ContentStore, PublishMetadata};

/// Default Pinata upload endpoint.
pub const DEFAULT_UPLOAD_URL: &str = "https://uploads.pinata.cloud/v3/files";

/// Configuration for a [`PinataStore`].
#[derive(Debug, Clone)]
pub struct PinataConfig {
    /// Upload endpoint accepting a multipart `file` field.
    pub upload_url: String,
    /// Gateway host or base URL (`example.mypinata.cloud` or
    /// `https://example.mypinata.cloud`).
    pub gateway: String,
    /// Bearer token for uploads. Resolving needs no credentials.
    pub jwt: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl PinataConfig {
    /// Configuration for a gateway with the default upload endpoint.
    pub fn new(gateway: impl Into<String>) -> Self {
        Self {
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            gateway: gateway.into(),
            jwt: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_jwt(mut self, jwt: impl Into<String>) -> Self {
        self.jwt = Some(jwt.into());
        self
    }

    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Pinning service + gateway store.
pub struct PinataStore {
    client: Client,
    upload_url: String,
    gateway_base: String,
    jwt: Option<String>,
}

/// Upload response. The v3 API nests the CID under `data`; the legacy
/// pinning endpoint returns it as `IpfsHash`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UploadResponse {
    V3 { data: UploadData },
    Legacy {
        #[serde(rename = "IpfsHash")]
        ipfs_hash: String,
    },
}

#[derive(Debug, Deserialize)]
struct UploadData {
    cid: String,
}

impl UploadResponse {
    fn into_cid(self) -> String {
        match self {
            UploadResponse::V3 { data } => data.cid,
            UploadResponse::Legacy { ipfs_hash } => ipfs_hash,
        }
    }
}

impl PinataStore {
    /// Create a store from configuration.
    pub fn new(config: PinataConfig) -> Result<Self> {
        if config.gateway.trim().is_empty() {
            return Err(StoreError::Config("gateway must not be empty".into()));
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            upload_url: config.upload_url,
            gateway_base: gateway_base(&config.gateway),
            jwt: config.jwt,
        })
    }

    /// The gateway URL a CID resolves through.
    pub fn gateway_url(&self, cid: &ContentAddress) -> String {
        format!("{}/ipfs/{}", self.gateway_base, cid)
    }
}

/// Normalize a gateway host or URL to a base URL without trailing slash.
fn gateway_base(gateway: &str) -> String {
    let gateway = gateway.trim().trim_end_matches('/');
    if gateway.starts_with("http://") || gateway.starts_with("https://") {
        gateway.to_string()
    } else {
        format!("https://{}", gateway)
    }
}

#[async_trait]
impl ContentStore for PinataStore {
    async fn publish(
        &self,
        blob: &[u8],
        meta: &PublishMetadata,
    ) -> std::result::Result<ContentAddress, PublishError> {
        let jwt = self
            .jwt
            .as_deref()
            .ok_or_else(|| PublishError::UploadFailed("no pinning credentials configured".into()))?;

        let part = multipart::Part::bytes(blob.to_vec())
            .file_name(meta.name.clone())
            .mime_str(&meta.content_type)
            .map_err(|e| PublishError::UploadFailed(e.to_string()))?;
        let form = multipart::Form::new()
            .text("network", "public")
            .part("file", part);

        let response = self
            .client
            .post(&self.upload_url)
            .header(header::AUTHORIZATION, format!("Bearer {}", jwt))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PublishError::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "pinning service rejected upload");
            return Err(PublishError::UploadFailed(format!(
                "pinning service returned {}",
                status
            )));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| PublishError::UploadFailed(format!("unexpected upload response: {}", e)))?;

        let cid = parsed.into_cid();
        if cid.is_empty() {
            return Err(PublishError::UploadFailed(
                "pinning service returned an empty CID".into(),
            ));
        }

        debug!(%cid, name = %meta.name, "pinned blob");
        Ok(ContentAddress::new(cid))
    }

    async fn resolve(&self, cid: &ContentAddress) -> std::result::Result<Bytes, ResolveError> {
        let url = self.gateway_url(cid);

        let response = self
            .client
            .get(&url)
            .header(header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ResolveError::GatewayTimeout(cid.clone())
                } else {
                    ResolveError::Unavailable {
                        cid: cid.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        match response.status() {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => return Err(ResolveError::NotFound(cid.clone())),
            StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => {
                return Err(ResolveError::GatewayTimeout(cid.clone()))
            }
            s => {
                return Err(ResolveError::Unavailable {
                    cid: cid.clone(),
                    reason: format!("gateway returned {}", s),
                })
            }
        }

        response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ResolveError::GatewayTimeout(cid.clone())
            } else {
                ResolveError::Unavailable {
                    cid: cid.clone(),
                    reason: e.to_string(),
                }
            }
        })
    }

    fn backend(&self) -> &'static str {
        "pinata"
    }
}
