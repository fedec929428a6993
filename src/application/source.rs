//! Content source port: the read-only CMS queries the service depends on.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("content source is not configured")]
    NotConfigured,
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("upstream responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("entry `{id}` not found")]
    NotFound { id: String },
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// One provider page object, optionally with its block tree.
///
/// Opaque outside the transform layer: callers can read the id, everything
/// else is provider-shaped and only interpreted by `application::transform`.
/// Instances come from [`crate::application::sanitize::Sanitize`], which
/// guarantees an object with a non-empty `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    id: String,
    page: Map<String, Value>,
    blocks: Option<Vec<Value>>,
}

impl RawRecord {
    pub(crate) fn new(id: String, page: Map<String, Value>) -> Self {
        Self {
            id,
            page,
            blocks: None,
        }
    }

    /// Attach the block tree fetched for a detail view.
    pub fn with_blocks(mut self, blocks: Vec<Value>) -> Self {
        self.blocks = Some(blocks);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn page(&self) -> &Map<String, Value> {
        &self.page
    }

    pub(crate) fn blocks(&self) -> Option<&[Value]> {
        self.blocks.as_deref()
    }
}

/// Read-only queries against the external CMS.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// True when credentials are present; an unconfigured source must not be queried.
    fn is_configured(&self) -> bool;

    /// Published entries of a collection, newest first.
    async fn list_published(&self, collection_id: &str) -> Result<Vec<RawRecord>, ClientError>;

    /// One entry with its full block tree.
    async fn get_entry_body(&self, entry_id: &str) -> Result<RawRecord, ClientError>;
}
