//! Loosely-shaped JSON → typed values.
//!
//! [`Sanitize::sanitize`] returns `None` only when the input is not an object
//! or lacks a field the target cannot do without. A wrong-typed optional field
//! is dropped or defaulted; one bad field never rejects the whole entry.

use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing::debug;

use crate::application::source::RawRecord;
use crate::application::transform::parse_timestamp;
use crate::domain::slug::slug_or_fallback;
use crate::domain::{
    ContentBody, ContentPreview, GalleryImage, ProjectBody, ProjectCategory, ProjectPreview,
    ProjectStat,
};

pub trait Sanitize: Sized {
    fn sanitize(value: &Value) -> Option<Self>;
}

fn reject<T>(shape: &'static str, reason: &'static str) -> Option<T> {
    debug!(target = "folio::sanitize", shape, reason, "Rejected value");
    None
}

fn object<'a>(value: &'a Value, shape: &'static str) -> Option<&'a Map<String, Value>> {
    match value.as_object() {
        Some(object) => Some(object),
        None => reject(shape, "not an object"),
    }
}

fn optional_str(object: &Map<String, Value>, key: &str) -> Option<String> {
    let text = object.get(key)?.as_str()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn required_str(
    object: &Map<String, Value>,
    key: &'static str,
    shape: &'static str,
) -> Option<String> {
    match optional_str(object, key) {
        Some(text) => Some(text),
        None => reject(shape, key),
    }
}

fn optional_timestamp(object: &Map<String, Value>, key: &str) -> Option<OffsetDateTime> {
    object.get(key)?.as_str().and_then(parse_timestamp)
}

fn string_list(object: &Map<String, Value>, key: &str) -> Vec<String> {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn optional_u32(object: &Map<String, Value>, key: &str) -> Option<u32> {
    object
        .get(key)?
        .as_u64()
        .and_then(|number| u32::try_from(number).ok())
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn content_tree(object: &Map<String, Value>) -> Value {
    object
        .get("content")
        .filter(|content| content.is_array())
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()))
}

impl Sanitize for RawRecord {
    /// Provider page object: must be an object with a non-empty string `id`.
    fn sanitize(value: &Value) -> Option<Self> {
        const SHAPE: &str = "raw_record";
        let page = object(value, SHAPE)?;
        let id = required_str(page, "id", SHAPE)?;
        Some(RawRecord::new(id, page.clone()))
    }
}

impl Sanitize for ContentPreview {
    fn sanitize(value: &Value) -> Option<Self> {
        const SHAPE: &str = "content_preview";
        let object = object(value, SHAPE)?;
        let id = required_str(object, "id", SHAPE)?;
        let title = required_str(object, "title", SHAPE)?;
        let Some(published_at) = optional_timestamp(object, "publishedAt") else {
            return reject(SHAPE, "publishedAt");
        };
        let slug = optional_str(object, "slug").unwrap_or_else(|| slug_or_fallback(&title, &id));

        Some(Self {
            id,
            slug,
            title,
            description: optional_str(object, "description"),
            published_at,
            tags: string_list(object, "tags"),
            category: optional_str(object, "category"),
            cover_image: optional_str(object, "coverImage"),
            reading_time: optional_u32(object, "readingTime"),
        })
    }
}

impl Sanitize for ContentBody {
    fn sanitize(value: &Value) -> Option<Self> {
        let preview = ContentPreview::sanitize(value)?;
        let object = value.as_object()?;

        Some(Self {
            updated_at: optional_timestamp(object, "updatedAt").unwrap_or(preview.published_at),
            published: object
                .get("published")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            content: content_tree(object),
            preview,
        })
    }
}

impl Sanitize for ProjectPreview {
    fn sanitize(value: &Value) -> Option<Self> {
        const SHAPE: &str = "project_preview";
        let object = object(value, SHAPE)?;
        let id = required_str(object, "id", SHAPE)?;
        let title = required_str(object, "title", SHAPE)?;
        let Some(published_at) = optional_timestamp(object, "publishedAt") else {
            return reject(SHAPE, "publishedAt");
        };
        let slug = optional_str(object, "slug").unwrap_or_else(|| slug_or_fallback(&title, &id));

        Some(Self {
            id,
            slug,
            title,
            description: optional_str(object, "description"),
            published_at,
            tags: string_list(object, "tags"),
            category: optional_str(object, "category")
                .map(|label| ProjectCategory::parse_lenient(&label))
                .unwrap_or_default(),
            cover_image: optional_str(object, "coverImage"),
            reading_time: optional_u32(object, "readingTime"),
            award: optional_str(object, "award"),
            award_rank: object.get("awardRank").and_then(display_value),
            tech_stack: string_list(object, "techStack"),
        })
    }
}

impl Sanitize for ProjectBody {
    fn sanitize(value: &Value) -> Option<Self> {
        let preview = ProjectPreview::sanitize(value)?;
        let object = value.as_object()?;

        let stats = object
            .get("stats")
            .and_then(Value::as_array)
            .map(|stats| {
                stats
                    .iter()
                    .filter_map(|stat| {
                        Some(ProjectStat {
                            label: stat.get("label").and_then(display_value)?,
                            value: stat.get("value").and_then(display_value)?,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let gallery = object
            .get("gallery")
            .and_then(Value::as_array)
            .map(|images| {
                images
                    .iter()
                    .filter_map(|image| match image {
                        Value::String(url) => Some(GalleryImage {
                            url: url.clone(),
                            caption: None,
                        }),
                        Value::Object(image) => Some(GalleryImage {
                            url: optional_str(image, "url")?,
                            caption: optional_str(image, "caption"),
                        }),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            updated_at: optional_timestamp(object, "updatedAt").unwrap_or(preview.published_at),
            published: object
                .get("published")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            stats,
            gallery,
            key_features: string_list(object, "keyFeatures"),
            repository_url: optional_str(object, "repositoryUrl"),
            live_url: optional_str(object, "liveUrl"),
            content: content_tree(object),
            preview,
        })
    }
}
