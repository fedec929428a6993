use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
};

use crate::domain::{ContentBody, ContentPreview, ProjectBody, ProjectPreview};

use super::{
    ApiError, HttpState,
    middleware::{ContentOrigin, trace_content},
};

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/api/blog", get(list_blog))
        .route("/api/blog/{slug}", get(blog_detail))
        .route("/api/projects", get(list_projects))
        .route("/api/projects/{id}", get(project_detail))
        .route("/_health/live", get(live))
        .with_state(state)
        .layer(middleware::from_fn(trace_content))
}

type Served<T> = (Extension<ContentOrigin>, Json<T>);

fn served<T>(origin: ContentOrigin, value: T) -> Served<T> {
    (Extension(origin), Json(value))
}

async fn list_blog(State(state): State<HttpState>) -> Served<Vec<ContentPreview>> {
    if state.content.is_blog_configured() {
        served(ContentOrigin::Cms, state.content.get_all_blog_previews().await)
    } else {
        served(ContentOrigin::Catalog, state.catalog.blog_previews())
    }
}

async fn blog_detail(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Result<Served<ContentBody>, ApiError> {
    let (origin, body) = if state.content.is_blog_configured() {
        (
            ContentOrigin::Cms,
            state.content.get_blog_body_by_slug(&slug).await?,
        )
    } else {
        (ContentOrigin::Catalog, state.catalog.blog_body_by_slug(&slug))
    };
    body.map(|body| served(origin, body))
        .ok_or_else(|| ApiError::not_found("Blog post not found"))
}

async fn list_projects(State(state): State<HttpState>) -> Served<Vec<ProjectPreview>> {
    if state.content.is_projects_configured() {
        served(ContentOrigin::Cms, state.content.get_all_project_previews().await)
    } else {
        served(ContentOrigin::Catalog, state.catalog.project_previews())
    }
}

async fn project_detail(
    State(state): State<HttpState>,
    Path(id): Path<String>,
) -> Result<Served<ProjectBody>, ApiError> {
    let (origin, body) = if state.content.is_projects_configured() {
        (
            ContentOrigin::Cms,
            state.content.get_project_body_by_id(&id).await?,
        )
    } else {
        (ContentOrigin::Catalog, state.catalog.project_body_by_id(&id))
    };
    body.map(|body| served(origin, body))
        .ok_or_else(|| ApiError::not_found("Project not found"))
}

async fn live() -> StatusCode {
    StatusCode::NO_CONTENT
}
