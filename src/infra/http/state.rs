use std::sync::Arc;

use crate::application::{catalog::StaticCatalog, service::ContentService};

/// Shared by the public router's handlers.
#[derive(Clone)]
pub struct HttpState {
    pub content: Arc<ContentService>,
    /// Answers for content types the CMS is not configured for.
    pub catalog: Arc<StaticCatalog>,
}

#[derive(Clone)]
pub struct AdminState {
    pub content: Arc<ContentService>,
}
