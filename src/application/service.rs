//! Content service: the single entry point for page-rendering code.
//!
//! Every query composes source → transform → cache. Listings degrade to an
//! empty result when the CMS is unavailable; detail lookups report "not found"
//! as `Ok(None)` and propagate genuine upstream failures.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::application::source::{ClientError, ContentSource};
use crate::application::transform;
use crate::cache::{CacheConfig, CacheKey, CacheStats, TtlCache};
use crate::domain::{ContentBody, ContentPreview, ProjectBody, ProjectPreview};

pub const BLOG_NAMESPACE: &str = "blog";
pub const PROJECTS_NAMESPACE: &str = "projects";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// CMS collection identifiers per content type; `None` disables that type.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub blog: Option<String>,
    pub projects: Option<String>,
}

pub struct ContentService {
    cache: Arc<TtlCache>,
    source: Arc<dyn ContentSource>,
    collections: Collections,
    config: CacheConfig,
}

impl ContentService {
    pub fn new(
        cache: Arc<TtlCache>,
        source: Arc<dyn ContentSource>,
        collections: Collections,
        config: CacheConfig,
    ) -> Self {
        Self {
            cache,
            source,
            collections,
            config,
        }
    }

    pub fn is_blog_configured(&self) -> bool {
        self.blog_collection().is_some()
    }

    pub fn is_projects_configured(&self) -> bool {
        self.projects_collection().is_some()
    }

    fn blog_collection(&self) -> Option<&str> {
        self.source
            .is_configured()
            .then_some(self.collections.blog.as_deref())
            .flatten()
    }

    fn projects_collection(&self) -> Option<&str> {
        self.source
            .is_configured()
            .then_some(self.collections.projects.as_deref())
            .flatten()
    }

    /// All published blog previews, newest first. Empty when unavailable.
    pub async fn get_all_blog_previews(&self) -> Vec<ContentPreview> {
        let Some(collection) = self.blog_collection() else {
            debug!(target = "folio::service", "Blog source not configured");
            return Vec::new();
        };

        let key = CacheKey::list(BLOG_NAMESPACE);
        self.cache
            .get_cached_data_or(
                &key,
                self.config.list_ttl,
                || async {
                    let records = self.source.list_published(collection).await?;
                    Ok::<_, ClientError>(records.iter().map(transform::to_preview).collect())
                },
                Vec::new(),
            )
            .await
    }

    /// The published post whose slug matches, with its block tree.
    pub async fn get_blog_body_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ContentBody>, ServiceError> {
        if !self.is_blog_configured() {
            return Ok(None);
        }

        let previews = self.get_all_blog_previews().await;
        let Some(preview) = previews.into_iter().find(|preview| preview.slug == slug) else {
            debug!(target = "folio::service", slug, "No blog post with this slug");
            return Ok(None);
        };

        let key = CacheKey::single(BLOG_NAMESPACE, slug);
        let result = self
            .cache
            .get_cached_data(&key, self.config.detail_ttl, || async {
                let raw = self.source.get_entry_body(&preview.id).await?;
                Ok::<_, ClientError>(transform::to_body(&raw))
            })
            .await;

        match result {
            Ok(body) => Ok(Some(body)),
            Err(err) if err.is_not_found() => {
                debug!(
                    target = "folio::service",
                    slug,
                    id = %preview.id,
                    "Listed blog post is gone upstream"
                );
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// All published project previews, newest first. Empty when unavailable.
    pub async fn get_all_project_previews(&self) -> Vec<ProjectPreview> {
        let Some(collection) = self.projects_collection() else {
            debug!(target = "folio::service", "Projects source not configured");
            return Vec::new();
        };

        let key = CacheKey::list(PROJECTS_NAMESPACE);
        self.cache
            .get_cached_data_or(
                &key,
                self.config.list_ttl,
                || async {
                    let records = self.source.list_published(collection).await?;
                    Ok::<_, ClientError>(
                        records.iter().map(transform::to_project_preview).collect(),
                    )
                },
                Vec::new(),
            )
            .await
    }

    /// One project by CMS id, with gallery, stats and block tree.
    pub async fn get_project_body_by_id(
        &self,
        id: &str,
    ) -> Result<Option<ProjectBody>, ServiceError> {
        if !self.is_projects_configured() {
            return Ok(None);
        }

        let key = CacheKey::single(PROJECTS_NAMESPACE, id);
        let result = self
            .cache
            .get_cached_data(&key, self.config.detail_ttl, || async {
                let raw = self.source.get_entry_body(id).await?;
                Ok::<_, ClientError>(transform::to_project_body(&raw))
            })
            .await;

        match result {
            Ok(body) => Ok(Some(body)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Drop every cached entry. Returns the number removed.
    pub fn invalidate_all(&self) -> usize {
        let removed = self.cache.clear(None);
        info!(target = "folio::service", removed, "Invalidated all cached content");
        removed
    }

    /// Drop every cached entry of one namespace (`blog`, `projects`).
    pub fn invalidate_namespace(&self, namespace: &str) -> usize {
        let removed = self.cache.clear(Some(&format!("{namespace}:")));
        info!(
            target = "folio::service",
            namespace,
            removed,
            "Invalidated cached namespace"
        );
        removed
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache_keys(&self) -> Vec<String> {
        self.cache.keys()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::application::sanitize::Sanitize;
    use crate::application::source::RawRecord;

    #[derive(Default)]
    struct StubSource {
        configured: bool,
        records: Vec<RawRecord>,
        fail_list: bool,
        gone_bodies: Vec<String>,
        list_calls: AtomicUsize,
        body_calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ContentSource for StubSource {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn list_published(&self, _collection: &str) -> Result<Vec<RawRecord>, ClientError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list {
                return Err(ClientError::Status {
                    status: 502,
                    body: "bad gateway".into(),
                });
            }
            Ok(self.records.clone())
        }

        async fn get_entry_body(&self, entry_id: &str) -> Result<RawRecord, ClientError> {
            self.body_calls
                .lock()
                .expect("body calls lock")
                .push(entry_id.to_string());
            if self.gone_bodies.iter().any(|id| id == entry_id) {
                return Err(ClientError::NotFound {
                    id: entry_id.to_string(),
                });
            }
            self.records
                .iter()
                .find(|record| record.id() == entry_id)
                .cloned()
                .map(|record| record.with_blocks(vec![json!({ "type": "divider", "divider": {} })]))
                .ok_or_else(|| ClientError::NotFound {
                    id: entry_id.to_string(),
                })
        }
    }

    fn record(id: &str, title: &str) -> RawRecord {
        RawRecord::sanitize(&json!({
            "id": id,
            "properties": { "Name": { "type": "title", "title": [{ "plain_text": title }] } }
        }))
        .expect("raw record")
    }

    fn service(source: StubSource, collections: Collections) -> (Arc<StubSource>, ContentService) {
        let source = Arc::new(source);
        let service = ContentService::new(
            Arc::new(TtlCache::new()),
            source.clone(),
            collections,
            CacheConfig::default(),
        );
        (source, service)
    }

    fn both() -> Collections {
        Collections {
            blog: Some("blog-db".into()),
            projects: Some("projects-db".into()),
        }
    }

    #[tokio::test]
    async fn unconfigured_source_reports_absent_content() {
        let (source, service) = service(StubSource::default(), both());

        assert!(!service.is_blog_configured());
        assert!(!service.is_projects_configured());
        assert!(service.get_all_blog_previews().await.is_empty());
        assert!(service.get_blog_body_by_slug("x").await.expect("ok").is_none());
        assert!(service.get_project_body_by_id("x").await.expect("ok").is_none());
        assert_eq!(source.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_collection_disables_only_that_type() {
        let stub = StubSource {
            configured: true,
            ..Default::default()
        };
        let (_, service) = service(
            stub,
            Collections {
                blog: Some("blog-db".into()),
                projects: None,
            },
        );

        assert!(service.is_blog_configured());
        assert!(!service.is_projects_configured());
    }

    #[tokio::test]
    async fn list_failure_falls_back_to_empty_and_is_retried() {
        let stub = StubSource {
            configured: true,
            fail_list: true,
            ..Default::default()
        };
        let (source, service) = service(stub, both());

        assert!(service.get_all_blog_previews().await.is_empty());
        assert!(service.get_all_blog_previews().await.is_empty());
        assert_eq!(source.list_calls.load(Ordering::SeqCst), 2);
        assert!(service.cache_keys().is_empty());
    }

    #[tokio::test]
    async fn blog_body_resolved_by_slug_and_cached() {
        let stub = StubSource {
            configured: true,
            records: vec![record("id-1", "First Post"), record("id-2", "Second Post")],
            ..Default::default()
        };
        let (source, service) = service(stub, both());

        let body = service
            .get_blog_body_by_slug("second-post")
            .await
            .expect("lookup succeeds")
            .expect("post exists");
        assert_eq!(body.id(), "id-2");
        assert_eq!(body.content, json!([{ "type": "divider", "divider": {} }]));

        service
            .get_blog_body_by_slug("second-post")
            .await
            .expect("cached lookup");
        assert_eq!(
            *source.body_calls.lock().expect("body calls lock"),
            vec!["id-2".to_string()]
        );
        assert_eq!(
            service.cache_keys(),
            vec!["blog:list".to_string(), "blog:single:second-post".to_string()]
        );
    }

    #[tokio::test]
    async fn unknown_slug_is_absent_not_an_error() {
        let stub = StubSource {
            configured: true,
            records: vec![record("id-1", "First Post")],
            ..Default::default()
        };
        let (source, service) = service(stub, both());

        let body = service.get_blog_body_by_slug("nope").await.expect("no error");
        assert!(body.is_none());
        assert!(source.body_calls.lock().expect("body calls lock").is_empty());
    }

    #[tokio::test]
    async fn listed_post_deleted_upstream_is_absent() {
        let stub = StubSource {
            configured: true,
            records: vec![record("gone", "Vanished Post")],
            gone_bodies: vec!["gone".into()],
            ..Default::default()
        };
        let (source, service) = service(stub, both());

        let body = service
            .get_blog_body_by_slug("vanished-post")
            .await
            .expect("upstream 404 is not an error");
        assert!(body.is_none());
        assert_eq!(
            *source.body_calls.lock().expect("body calls lock"),
            vec!["gone".to_string()]
        );
        assert_eq!(service.cache_keys(), vec!["blog:list".to_string()]);
    }

    #[tokio::test]
    async fn project_not_found_is_absent() {
        let stub = StubSource {
            configured: true,
            records: vec![record("proj-1", "Trail Finder")],
            ..Default::default()
        };
        let (_, service) = service(stub, both());

        let found = service
            .get_project_body_by_id("proj-1")
            .await
            .expect("lookup succeeds");
        assert_eq!(found.map(|body| body.preview.slug), Some("trail-finder".into()));

        let missing = service
            .get_project_body_by_id("proj-404")
            .await
            .expect("not found is not an error");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn namespace_invalidation_leaves_other_namespaces() {
        let stub = StubSource {
            configured: true,
            records: vec![record("id-1", "Shared")],
            ..Default::default()
        };
        let (source, service) = service(stub, both());

        service.get_all_blog_previews().await;
        service.get_all_project_previews().await;
        assert_eq!(service.invalidate_namespace(PROJECTS_NAMESPACE), 1);
        assert_eq!(service.cache_keys(), vec!["blog:list".to_string()]);

        service.get_all_project_previews().await;
        assert_eq!(source.list_calls.load(Ordering::SeqCst), 3);

        assert_eq!(service.invalidate_all(), 2);
        assert!(service.cache_keys().is_empty());
    }
}
