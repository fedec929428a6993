use axum::{
    Json, Router,
    extract::{Query, State},
    middleware,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::application::service::{BLOG_NAMESPACE, PROJECTS_NAMESPACE};
use crate::cache::CacheStats;

use super::{AdminState, ApiError, middleware::trace_content};

pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/cache/invalidate", post(invalidate_cache))
        .route("/cache/stats", get(cache_stats))
        .with_state(state)
        .layer(middleware::from_fn(trace_content))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InvalidateQuery {
    namespace: Option<String>,
}

#[derive(Debug, Serialize)]
struct InvalidateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    removed: usize,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    #[serde(flatten)]
    stats: CacheStats,
    keys: Vec<String>,
}

async fn invalidate_cache(
    State(state): State<AdminState>,
    Query(query): Query<InvalidateQuery>,
) -> Result<Json<InvalidateResponse>, ApiError> {
    let removed = match query.namespace.as_deref() {
        None => state.content.invalidate_all(),
        Some(namespace @ (BLOG_NAMESPACE | PROJECTS_NAMESPACE)) => {
            state.content.invalidate_namespace(namespace)
        }
        Some(other) => {
            return Err(ApiError::bad_request(
                "Unknown cache namespace",
                Some(format!("`{other}` is not one of `blog`, `projects`")),
            ));
        }
    };

    Ok(Json(InvalidateResponse {
        namespace: query.namespace,
        removed,
    }))
}

async fn cache_stats(State(state): State<AdminState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        stats: state.content.cache_stats(),
        keys: state.content.cache_keys(),
    })
}
