use std::sync::Arc;

use tracing::{info, warn};

use crate::application::catalog::StaticCatalog;
use crate::application::error::AppError;
use crate::application::service::{Collections, ContentService};
use crate::application::source::ContentSource;
use crate::cache::{CacheConfig, TtlCache};
use crate::config::Settings;
use crate::infra::notion::NotionClient;

/// Shared handles for the `serve` and `dump` commands.
pub struct ApplicationContext {
    pub content: Arc<ContentService>,
    pub catalog: Arc<StaticCatalog>,
}

impl ApplicationContext {
    pub async fn build(settings: &Settings) -> Result<Self, AppError> {
        let client = NotionClient::new(&settings.notion)?;
        if !client.is_configured() {
            warn!(
                target = "folio::bootstrap",
                "Notion token not set; serving the static catalog"
            );
        }

        let content = ContentService::new(
            Arc::new(TtlCache::new()),
            Arc::new(client),
            Collections {
                blog: settings.notion.blog_database_id.clone(),
                projects: settings.notion.projects_database_id.clone(),
            },
            CacheConfig::from(&settings.cache),
        );

        let catalog = match settings.content.fallback_path.as_deref() {
            Some(path) => StaticCatalog::load(path).await?,
            None => StaticCatalog::default(),
        };

        info!(
            target = "folio::bootstrap",
            blog_configured = content.is_blog_configured(),
            projects_configured = content.is_projects_configured(),
            "Content service ready"
        );

        Ok(Self {
            content: Arc::new(content),
            catalog: Arc::new(catalog),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use serde_json::json;
    use tracing::level_filters::LevelFilter;
    use url::Url;

    use super::*;
    use crate::config::{
        CacheSettings, ContentSettings, LogFormat, LoggingSettings, NotionSettings,
        ServerSettings,
    };

    fn settings(token: Option<&str>, fallback_path: Option<std::path::PathBuf>) -> Settings {
        Settings {
            server: ServerSettings {
                public_addr: "127.0.0.1:3000".parse().expect("public addr"),
                admin_addr: "127.0.0.1:3001".parse().expect("admin addr"),
            },
            logging: LoggingSettings {
                level: LevelFilter::INFO,
                format: LogFormat::Compact,
            },
            notion: NotionSettings {
                token: token.map(str::to_string),
                api_base: Url::parse("https://api.notion.com").expect("api base"),
                api_version: "2022-06-28".to_string(),
                blog_database_id: Some("blog-db".to_string()),
                projects_database_id: None,
                timeout: Duration::from_secs(5),
            },
            cache: CacheSettings {
                list_ttl: Duration::from_secs(300),
                detail_ttl: Duration::from_secs(600),
            },
            content: ContentSettings { fallback_path },
        }
    }

    #[tokio::test]
    async fn without_token_only_the_catalog_serves_content() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let document = json!({
            "posts": [{ "id": "local-1", "title": "Local Post", "publishedAt": "2023-01-01", "published": true }]
        });
        write!(file, "{document}").expect("write catalog");

        let context = ApplicationContext::build(&settings(None, Some(file.path().to_path_buf())))
            .await
            .expect("context builds");

        assert!(!context.content.is_blog_configured());
        assert!(!context.content.is_projects_configured());
        assert_eq!(context.catalog.blog_previews().len(), 1);
    }

    #[tokio::test]
    async fn token_and_collection_enable_the_cms() {
        let context = ApplicationContext::build(&settings(Some("secret_token"), None))
            .await
            .expect("context builds");

        assert!(context.content.is_blog_configured());
        assert!(!context.content.is_projects_configured());
        assert!(context.catalog.blog_previews().is_empty());
    }

    #[tokio::test]
    async fn malformed_catalog_fails_startup() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "[not json").expect("write catalog");

        let result =
            ApplicationContext::build(&settings(None, Some(file.path().to_path_buf()))).await;
        assert!(matches!(result, Err(AppError::Infra(_))));
    }
}
