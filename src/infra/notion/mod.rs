//! Notion REST adapter for [`ContentSource`].
//!
//! Only read endpoints are used: database query for listings, page retrieval
//! plus block children for detail views. A client without a token is inert and
//! reports `is_configured() == false`.

#[cfg(test)]
mod tests;

use std::time::Instant;

use async_trait::async_trait;
use futures::future::BoxFuture;
use metrics::{counter, histogram};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::application::sanitize::Sanitize;
use crate::application::source::{ClientError, ContentSource, RawRecord};
use crate::config::NotionSettings;

pub const METRIC_NOTION_REQUEST_MS: &str = "folio_notion_request_ms";
pub const METRIC_NOTION_REQUEST_ERROR: &str = "folio_notion_request_error_total";

const NOTION_VERSION_HEADER: &str = "Notion-Version";
const PAGE_SIZE: u32 = 100;
/// Deepest block nesting level fetched; top-level blocks are level 1.
const MAX_BLOCK_DEPTH: usize = 3;

#[derive(Clone)]
pub struct NotionClient {
    http: Client,
    base: Url,
    token: Option<String>,
    api_version: String,
}

impl NotionClient {
    pub fn new(settings: &NotionSettings) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(ClientError::transport)?;

        Ok(Self {
            http,
            base: settings.api_base.clone(),
            token: settings
                .token
                .as_deref()
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string),
            api_version: settings.api_version.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("folio/", env!("CARGO_PKG_VERSION"))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send an authenticated request and decode the JSON body. A 404 is
    /// reported as `NotFound` for `resource_id`.
    async fn execute(&self, request: RequestBuilder, resource_id: &str) -> Result<Value, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotConfigured)?;
        let request = request
            .bearer_auth(token)
            .header(NOTION_VERSION_HEADER, self.api_version.as_str());

        let started = Instant::now();
        let result = Self::exchange(request, resource_id).await;
        histogram!(METRIC_NOTION_REQUEST_MS).record(started.elapsed().as_secs_f64() * 1000.0);

        if let Err(err) = &result {
            if !err.is_not_found() {
                counter!(METRIC_NOTION_REQUEST_ERROR).increment(1);
                warn!(
                    target = "folio::notion",
                    resource_id,
                    error = %err,
                    "Notion request failed"
                );
            }
        }
        result
    }

    async fn exchange(request: RequestBuilder, resource_id: &str) -> Result<Value, ClientError> {
        let response = request.send().await.map_err(ClientError::transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(ClientError::transport)?;

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                id: resource_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        serde_json::from_slice(&bytes).map_err(ClientError::decode)
    }

    fn block_children<'a>(
        &'a self,
        block_id: &'a str,
        depth: usize,
    ) -> BoxFuture<'a, Result<Vec<Value>, ClientError>> {
        Box::pin(async move {
            let mut blocks = Vec::new();
            let mut cursor: Option<String> = None;

            loop {
                let mut url = self.endpoint(&["v1", "blocks", block_id, "children"])?;
                {
                    let mut query = url.query_pairs_mut();
                    query.append_pair("page_size", &PAGE_SIZE.to_string());
                    if let Some(cursor) = cursor.as_deref() {
                        query.append_pair("start_cursor", cursor);
                    }
                }

                // The page itself was already found; a missing block is an upstream fault.
                let page = self
                    .execute(self.http.get(url), block_id)
                    .await
                    .map_err(|err| match err {
                        ClientError::NotFound { id } => ClientError::Status {
                            status: StatusCode::NOT_FOUND.as_u16(),
                            body: format!("block `{id}` not found"),
                        },
                        other => other,
                    })?;
                blocks.extend(results(&page)?.iter().cloned());

                match next_cursor(&page) {
                    Some(next) => cursor = Some(next),
                    None => break,
                }
            }

            if depth < MAX_BLOCK_DEPTH {
                for block in &mut blocks {
                    let has_children = block
                        .get("has_children")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    let Some(child_id) = block.get("id").and_then(Value::as_str) else {
                        continue;
                    };
                    if !has_children {
                        continue;
                    }
                    let child_id = child_id.to_string();
                    let children = self.block_children(&child_id, depth + 1).await?;
                    if let Some(object) = block.as_object_mut() {
                        object.insert("children".to_string(), Value::Array(children));
                    }
                }
            }

            Ok(blocks)
        })
    }
}

fn results(page: &Value) -> Result<&Vec<Value>, ClientError> {
    page.get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| ClientError::decode("response has no `results` array"))
}

fn next_cursor(page: &Value) -> Option<String> {
    let has_more = page
        .get("has_more")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if !has_more {
        return None;
    }
    page.get("next_cursor")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl ContentSource for NotionClient {
    fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    async fn list_published(&self, collection_id: &str) -> Result<Vec<RawRecord>, ClientError> {
        let url = self.endpoint(&["v1", "databases", collection_id, "query"])?;
        let mut records = Vec::new();
        let mut dropped = 0usize;
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({
                "filter": { "property": "Published", "checkbox": { "equals": true } },
                "sorts": [{ "property": "Date", "direction": "descending" }],
                "page_size": PAGE_SIZE,
            });
            if let Some(cursor) = cursor.as_deref() {
                body["start_cursor"] = json!(cursor);
            }

            let page = self
                .execute(self.http.post(url.clone()).json(&body), collection_id)
                .await?;
            for item in results(&page)? {
                match RawRecord::sanitize(item) {
                    Some(record) => records.push(record),
                    None => dropped += 1,
                }
            }

            match next_cursor(&page) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        if dropped > 0 {
            warn!(
                target = "folio::notion",
                collection_id,
                dropped,
                "Dropped malformed records from database query"
            );
        }
        debug!(
            target = "folio::notion",
            collection_id,
            count = records.len(),
            "Fetched published records"
        );
        Ok(records)
    }

    async fn get_entry_body(&self, entry_id: &str) -> Result<RawRecord, ClientError> {
        let url = self.endpoint(&["v1", "pages", entry_id])?;
        let page = match self.execute(self.http.get(url), entry_id).await {
            // Notion answers malformed ids with 400 validation errors.
            Err(ClientError::Status { status: 400, .. }) => {
                return Err(ClientError::NotFound {
                    id: entry_id.to_string(),
                });
            }
            other => other?,
        };
        let record = RawRecord::sanitize(&page)
            .ok_or_else(|| ClientError::decode("page object has no `id`"))?;

        let blocks = self.block_children(record.id(), 1).await?;
        Ok(record.with_blocks(blocks))
    }
}
