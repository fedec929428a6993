//! Blog view models.

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

/// Listing-page summary of a blog post.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPreview {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<u32>,
}

/// A single blog post with its full block tree.
///
/// Every preview field keeps its meaning; `content` is the provider's block
/// tree, passed through untouched for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBody {
    #[serde(flatten)]
    pub preview: ContentPreview,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub published: bool,
    pub content: Value,
}

impl ContentBody {
    pub fn id(&self) -> &str {
        &self.preview.id
    }

    pub fn slug(&self) -> &str {
        &self.preview.slug
    }
}

impl From<ContentBody> for ContentPreview {
    fn from(body: ContentBody) -> Self {
        body.preview
    }
}
