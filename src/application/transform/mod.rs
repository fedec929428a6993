//! Raw CMS records → typed view models.
//!
//! Pure functions: no I/O, no clock reads, no hidden state. Transforming the
//! same record twice yields equal output. Missing optional fields are filled
//! with defaults instead of failing; derived fields (slug, reading time) are
//! computed from the record's own content.

mod properties;

use serde_json::Value;
use time::OffsetDateTime;

use crate::application::source::RawRecord;
use crate::domain::reading::estimate_reading_minutes;
use crate::domain::slug::slug_or_fallback;
use crate::domain::{
    ContentBody, ContentPreview, GalleryImage, ProjectBody, ProjectCategory, ProjectPreview,
    ProjectStat,
};

pub(crate) use properties::parse_timestamp;
use properties::{Properties, blocks_plain_text, file_url};

const UNTITLED: &str = "Untitled";

mod names {
    pub const SLUG: &[&str] = &["Slug"];
    pub const DESCRIPTION: &[&str] = &["Description", "Excerpt", "Summary"];
    pub const DATE: &[&str] = &["Date", "Published Date", "PublishedAt"];
    pub const TAGS: &[&str] = &["Tags"];
    pub const CATEGORY: &[&str] = &["Category"];
    pub const READING_TIME: &[&str] = &["Reading Time", "ReadingTime"];
    pub const PUBLISHED: &[&str] = &["Published"];
    pub const COVER: &[&str] = &["Cover", "Cover Image"];
    pub const AWARD: &[&str] = &["Award"];
    pub const AWARD_RANK: &[&str] = &["Award Rank", "AwardRank"];
    pub const TECH_STACK: &[&str] = &["Tech Stack", "TechStack", "Stack"];
    pub const KEY_FEATURES: &[&str] = &["Key Features", "KeyFeatures", "Features"];
    pub const STATS: &[&str] = &["Stats"];
    pub const GALLERY: &[&str] = &["Gallery", "Images"];
    pub const REPOSITORY: &[&str] = &["Repository", "GitHub", "Repo"];
    pub const LIVE: &[&str] = &["Live", "Demo", "Website"];
}

/// Fields shared by blog posts and projects.
struct Common {
    id: String,
    slug: String,
    title: String,
    description: Option<String>,
    published_at: OffsetDateTime,
    tags: Vec<String>,
    cover_image: Option<String>,
    reading_time: Option<u32>,
}

impl Common {
    fn read(raw: &RawRecord, props: &Properties<'_>) -> Self {
        let id = raw.id().to_string();
        let title = props.title().unwrap_or_else(|| UNTITLED.to_string());
        let slug = props
            .text(names::SLUG)
            .unwrap_or_else(|| slug_or_fallback(&title, &id));
        let description = props.text(names::DESCRIPTION);
        let published_at = props
            .date(names::DATE)
            .or_else(|| page_timestamp(raw, "created_time"))
            .unwrap_or(OffsetDateTime::UNIX_EPOCH);
        let cover_image = raw
            .page()
            .get("cover")
            .and_then(file_url)
            .or_else(|| props.files(names::COVER).into_iter().next().map(|(url, _)| url));
        let reading_time = explicit_reading_time(props).or_else(|| {
            raw.blocks()
                .map(|blocks| estimate_reading_minutes(&blocks_plain_text(blocks)))
        });

        Self {
            id,
            slug,
            title,
            description,
            published_at,
            tags: props.list(names::TAGS),
            cover_image,
            reading_time,
        }
    }
}

fn page_timestamp(raw: &RawRecord, field: &str) -> Option<OffsetDateTime> {
    raw.page()
        .get(field)
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
}

fn explicit_reading_time(props: &Properties<'_>) -> Option<u32> {
    props
        .number(names::READING_TIME)
        .filter(|minutes| minutes.is_finite() && *minutes >= 1.0)
        .map(|minutes| minutes.round().min(f64::from(u32::MAX)) as u32)
}

fn updated_at(raw: &RawRecord, fallback: OffsetDateTime) -> OffsetDateTime {
    page_timestamp(raw, "last_edited_time").unwrap_or(fallback)
}

fn content_tree(raw: &RawRecord) -> Value {
    Value::Array(raw.blocks().map(<[Value]>::to_vec).unwrap_or_default())
}

/// Blog listing summary.
pub fn to_preview(raw: &RawRecord) -> ContentPreview {
    let props = Properties::of(raw.page());
    let common = Common::read(raw, &props);

    ContentPreview {
        id: common.id,
        slug: common.slug,
        title: common.title,
        description: common.description,
        published_at: common.published_at,
        tags: common.tags,
        category: props.text(names::CATEGORY),
        cover_image: common.cover_image,
        reading_time: common.reading_time,
    }
}

/// Blog detail page; carries the block tree unmodified.
pub fn to_body(raw: &RawRecord) -> ContentBody {
    let preview = to_preview(raw);
    let props = Properties::of(raw.page());

    ContentBody {
        updated_at: updated_at(raw, preview.published_at),
        published: props.checkbox(names::PUBLISHED).unwrap_or(false),
        content: content_tree(raw),
        preview,
    }
}

/// Project listing summary.
pub fn to_project_preview(raw: &RawRecord) -> ProjectPreview {
    let props = Properties::of(raw.page());
    let common = Common::read(raw, &props);

    ProjectPreview {
        id: common.id,
        slug: common.slug,
        title: common.title,
        description: common.description,
        published_at: common.published_at,
        tags: common.tags,
        category: props
            .text(names::CATEGORY)
            .map(|label| ProjectCategory::parse_lenient(&label))
            .unwrap_or_default(),
        cover_image: common.cover_image,
        reading_time: common.reading_time,
        award: props.text(names::AWARD),
        award_rank: props.text(names::AWARD_RANK),
        tech_stack: props.list(names::TECH_STACK),
    }
}

/// Project detail page.
pub fn to_project_body(raw: &RawRecord) -> ProjectBody {
    let preview = to_project_preview(raw);
    let props = Properties::of(raw.page());

    ProjectBody {
        updated_at: updated_at(raw, preview.published_at),
        published: props.checkbox(names::PUBLISHED).unwrap_or(false),
        stats: props
            .text(names::STATS)
            .map(|text| parse_stats(&text))
            .unwrap_or_default(),
        gallery: props
            .files(names::GALLERY)
            .into_iter()
            .map(|(url, caption)| GalleryImage { url, caption })
            .collect(),
        key_features: props.list(names::KEY_FEATURES),
        repository_url: props.text(names::REPOSITORY),
        live_url: props.text(names::LIVE),
        content: content_tree(raw),
        preview,
    }
}

/// `label: value` pairs separated by newlines or `;`.
fn parse_stats(text: &str) -> Vec<ProjectStat> {
    text.split(['\n', ';'])
        .filter_map(|pair| {
            let (label, value) = pair.split_once(':')?;
            let (label, value) = (label.trim(), value.trim());
            (!label.is_empty() && !value.is_empty()).then(|| ProjectStat {
                label: label.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use super::*;
    use crate::application::sanitize::Sanitize;

    fn record(value: Value) -> RawRecord {
        RawRecord::sanitize(&value).expect("valid raw record")
    }

    fn title_prop(title: &str) -> Value {
        json!({ "type": "title", "title": [{ "plain_text": title }] })
    }

    fn paragraph(text: &str) -> Value {
        json!({ "type": "paragraph", "paragraph": { "rich_text": [{ "plain_text": text }] } })
    }

    #[test]
    fn slug_derived_from_title_when_missing() {
        let raw = record(json!({
            "id": "a1",
            "properties": { "Name": title_prop("Hello, World! 2024") }
        }));

        assert_eq!(to_preview(&raw).slug, "hello-world-2024");
    }

    #[test]
    fn explicit_slug_wins() {
        let raw = record(json!({
            "id": "a1",
            "properties": {
                "Name": title_prop("Hello"),
                "Slug": { "type": "rich_text", "rich_text": [{ "plain_text": "custom-slug" }] }
            }
        }));

        assert_eq!(to_preview(&raw).slug, "custom-slug");
    }

    #[test]
    fn reading_time_computed_from_body_text() {
        let text = vec!["word"; 320].join(" ");
        let raw = record(json!({
            "id": "a1",
            "properties": { "Name": title_prop("Long read") }
        }))
        .with_blocks(vec![paragraph(&text)]);

        assert_eq!(to_preview(&raw).reading_time, Some(2));
    }

    #[test]
    fn listing_reading_time_never_contradicts_body() {
        let page = json!({
            "id": "a1",
            "properties": {
                "Name": title_prop("Long read"),
                "Description": { "type": "rich_text", "rich_text": [{ "plain_text": "short" }] }
            }
        });
        let text = vec!["word"; 800].join(" ");
        let listed = record(page.clone());
        let detailed = record(page).with_blocks(vec![paragraph(&text)]);

        assert_eq!(to_preview(&listed).reading_time, None);
        assert_eq!(to_body(&detailed).preview.reading_time, Some(5));
    }

    #[test]
    fn explicit_reading_time_is_kept() {
        let raw = record(json!({
            "id": "a1",
            "properties": {
                "Name": title_prop("Quick"),
                "Reading Time": { "type": "number", "number": 7 }
            }
        }));

        assert_eq!(to_preview(&raw).reading_time, Some(7));
    }

    #[test]
    fn missing_optional_fields_default() {
        let raw = record(json!({ "id": "bare", "created_time": "2024-01-02T03:04:05.000Z" }));

        let preview = to_preview(&raw);
        assert_eq!(preview.title, "Untitled");
        assert_eq!(preview.slug, "untitled");
        assert!(preview.tags.is_empty());
        assert_eq!(preview.category, None);
        assert_eq!(preview.description, None);
        assert_eq!(preview.reading_time, None);
        assert_eq!(preview.published_at, datetime!(2024-01-02 3:04:05 UTC));
    }

    #[test]
    fn preview_maps_provider_properties() {
        let raw = record(json!({
            "id": "post-1",
            "cover": { "type": "external", "external": { "url": "https://img/cover.png" } },
            "properties": {
                "Title": title_prop("Caching in Rust"),
                "Description": { "type": "rich_text", "rich_text": [{ "plain_text": "Notes" }] },
                "Date": { "type": "date", "date": { "start": "2024-05-06" } },
                "Tags": { "type": "multi_select", "multi_select": [{ "name": "rust" }] },
                "Category": { "type": "select", "select": { "name": "Engineering" } }
            }
        }));

        let preview = to_preview(&raw);
        assert_eq!(preview.id, "post-1");
        assert_eq!(preview.title, "Caching in Rust");
        assert_eq!(preview.description.as_deref(), Some("Notes"));
        assert_eq!(preview.published_at, datetime!(2024-05-06 0:00 UTC));
        assert_eq!(preview.tags, vec!["rust"]);
        assert_eq!(preview.category.as_deref(), Some("Engineering"));
        assert_eq!(preview.cover_image.as_deref(), Some("https://img/cover.png"));
    }

    #[test]
    fn body_keeps_block_tree_untouched() {
        let blocks = vec![paragraph("hello"), json!({ "type": "divider", "divider": {} })];
        let raw = record(json!({
            "id": "post-1",
            "last_edited_time": "2024-06-01T00:00:00.000Z",
            "properties": {
                "Name": title_prop("Body"),
                "Published": { "type": "checkbox", "checkbox": true }
            }
        }))
        .with_blocks(blocks.clone());

        let body = to_body(&raw);
        assert_eq!(body.content, Value::Array(blocks));
        assert!(body.published);
        assert_eq!(body.updated_at, datetime!(2024-06-01 0:00 UTC));
        assert_eq!(body.preview, to_preview(&raw));
    }

    #[test]
    fn transform_is_idempotent() {
        let raw = record(json!({
            "id": "p",
            "properties": { "Name": title_prop("Same"), "Tags": { "type": "multi_select", "multi_select": [{ "name": "x" }] } }
        }));

        assert_eq!(to_body(&raw), to_body(&raw));
        assert_eq!(to_project_body(&raw), to_project_body(&raw));
    }

    #[test]
    fn project_fields_are_mapped() {
        let raw = record(json!({
            "id": "proj-1",
            "properties": {
                "Name": title_prop("Trail Finder"),
                "Category": { "type": "select", "select": { "name": "hackathon" } },
                "Award": { "type": "rich_text", "rich_text": [{ "plain_text": "Best Use of Maps" }] },
                "Award Rank": { "type": "select", "select": { "name": "1st" } },
                "Tech Stack": { "type": "multi_select", "multi_select": [{ "name": "Rust" }, { "name": "Svelte" }] },
                "Key Features": { "type": "multi_select", "multi_select": [{ "name": "Offline maps" }] },
                "Stats": { "type": "rich_text", "rich_text": [{ "plain_text": "Users: 1.2k; Stars: 300\nbogus line" }] },
                "Gallery": { "type": "files", "files": [
                    { "name": "Map view", "type": "external", "external": { "url": "https://img/map.png" } }
                ]},
                "GitHub": { "type": "url", "url": "https://github.com/example/trail" }
            }
        }));

        let body = to_project_body(&raw);
        assert_eq!(body.preview.category, ProjectCategory::Hackathon);
        assert_eq!(body.preview.award.as_deref(), Some("Best Use of Maps"));
        assert_eq!(body.preview.award_rank.as_deref(), Some("1st"));
        assert_eq!(body.preview.tech_stack, vec!["Rust", "Svelte"]);
        assert_eq!(body.key_features, vec!["Offline maps"]);
        assert_eq!(
            body.stats,
            vec![
                ProjectStat { label: "Users".into(), value: "1.2k".into() },
                ProjectStat { label: "Stars".into(), value: "300".into() },
            ]
        );
        assert_eq!(
            body.gallery,
            vec![GalleryImage {
                url: "https://img/map.png".into(),
                caption: Some("Map view".into()),
            }]
        );
        assert_eq!(
            body.repository_url.as_deref(),
            Some("https://github.com/example/trail")
        );
        assert_eq!(body.live_url, None);
        assert_eq!(body.content, Value::Array(Vec::new()));
    }

    #[test]
    fn project_without_category_is_other() {
        let raw = record(json!({ "id": "p", "properties": { "Name": title_prop("X") } }));
        assert_eq!(to_project_preview(&raw).category, ProjectCategory::Other);
    }
}
