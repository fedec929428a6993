//! Portfolio project view models.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

/// Classification of a portfolio project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectCategory {
    Hackathon,
    Professional,
    Personal,
    OpenSource,
    Research,
    #[default]
    Other,
}

impl ProjectCategory {
    /// Parse a free-form label, ignoring case, spaces, `-` and `_`.
    ///
    /// Unknown labels classify as [`ProjectCategory::Other`].
    pub fn parse_lenient(label: &str) -> Self {
        let normalized: String = label
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .map(|ch| ch.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "hackathon" => Self::Hackathon,
            "professional" | "work" | "client" => Self::Professional,
            "personal" | "sideproject" => Self::Personal,
            "opensource" | "oss" => Self::OpenSource,
            "research" => Self::Research,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hackathon => "hackathon",
            Self::Professional => "professional",
            Self::Personal => "personal",
            Self::OpenSource => "open-source",
            Self::Research => "research",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ProjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A headline number shown on a project page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectStat {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryImage {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Listing-page summary of a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPreview {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    pub tags: Vec<String>,
    pub category: ProjectCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub award: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub award_rank: Option<String>,
    pub tech_stack: Vec<String>,
}

/// A single project with gallery, stats and block tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBody {
    #[serde(flatten)]
    pub preview: ProjectPreview,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub published: bool,
    pub stats: Vec<ProjectStat>,
    pub gallery: Vec<GalleryImage>,
    pub key_features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    pub content: Value,
}

impl ProjectBody {
    pub fn id(&self) -> &str {
        &self.preview.id
    }
}

impl From<ProjectBody> for ProjectPreview {
    fn from(body: ProjectBody) -> Self {
        body.preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parsing_ignores_case_and_separators() {
        assert_eq!(
            ProjectCategory::parse_lenient("Open Source"),
            ProjectCategory::OpenSource
        );
        assert_eq!(
            ProjectCategory::parse_lenient("open-source"),
            ProjectCategory::OpenSource
        );
        assert_eq!(
            ProjectCategory::parse_lenient("HACKATHON"),
            ProjectCategory::Hackathon
        );
    }

    #[test]
    fn unknown_category_is_other() {
        assert_eq!(
            ProjectCategory::parse_lenient("Underwater Basket Weaving"),
            ProjectCategory::Other
        );
        assert_eq!(ProjectCategory::parse_lenient(""), ProjectCategory::Other);
    }

    #[test]
    fn category_serializes_kebab_case() {
        let json = serde_json::to_string(&ProjectCategory::OpenSource).expect("serialize");
        assert_eq!(json, "\"open-source\"");
    }
}
