//! Local content used when the CMS is not configured.

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::application::sanitize::Sanitize;
use crate::domain::{ContentBody, ContentPreview, ProjectBody, ProjectPreview};
use crate::infra::error::InfraError;

/// Posts and projects read from a JSON file shaped `{ "posts": [...], "projects": [...] }`.
///
/// Entries are kept newest first, mirroring the order the CMS query returns.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    posts: Vec<ContentBody>,
    projects: Vec<ProjectBody>,
}

impl StaticCatalog {
    /// Read and validate the catalog file. A missing file yields an empty catalog.
    pub async fn load(path: &Path) -> Result<Self, InfraError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    target = "folio::catalog",
                    path = %path.display(),
                    "Catalog file not found; serving empty catalog"
                );
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };

        let document: Value = serde_json::from_str(&raw).map_err(|err| {
            InfraError::configuration(format!(
                "catalog `{}` is not valid JSON: {err}",
                path.display()
            ))
        })?;

        let catalog = Self::from_value(&document);
        info!(
            target = "folio::catalog",
            path = %path.display(),
            posts = catalog.posts.len(),
            projects = catalog.projects.len(),
            "Loaded static catalog"
        );
        Ok(catalog)
    }

    pub fn from_value(document: &Value) -> Self {
        let mut posts: Vec<ContentBody> = sanitize_all(document, "posts");
        let mut projects: Vec<ProjectBody> = sanitize_all(document, "projects");
        posts.sort_by(|a, b| b.preview.published_at.cmp(&a.preview.published_at));
        projects.sort_by(|a, b| b.preview.published_at.cmp(&a.preview.published_at));
        Self { posts, projects }
    }

    /// Published posts only, like the CMS listing query.
    pub fn blog_previews(&self) -> Vec<ContentPreview> {
        self.posts
            .iter()
            .filter(|post| post.published)
            .map(|post| post.preview.clone())
            .collect()
    }

    /// Slugs resolve against the published listing, so drafts are unreachable.
    pub fn blog_body_by_slug(&self, slug: &str) -> Option<ContentBody> {
        self.posts
            .iter()
            .find(|post| post.published && post.slug() == slug)
            .cloned()
    }

    pub fn project_previews(&self) -> Vec<ProjectPreview> {
        self.projects
            .iter()
            .filter(|project| project.published)
            .map(|project| project.preview.clone())
            .collect()
    }

    pub fn project_body_by_id(&self, id: &str) -> Option<ProjectBody> {
        self.projects
            .iter()
            .find(|project| project.id() == id)
            .cloned()
    }
}

fn sanitize_all<T: Sanitize>(document: &Value, field: &'static str) -> Vec<T> {
    let Some(items) = document.get(field).and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let sanitized = T::sanitize(item);
            if sanitized.is_none() {
                warn!(
                    target = "folio::catalog",
                    field,
                    index,
                    "Dropped invalid catalog entry"
                );
            }
            sanitized
        })
        .collect()
}
