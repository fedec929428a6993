use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, warn};

use crate::application::error::ErrorReport;
use crate::application::service::{BLOG_NAMESPACE, PROJECTS_NAMESPACE};

/// Response header naming where the payload came from.
pub const CONTENT_ORIGIN_HEADER: &str = "x-content-origin";

/// Which backend answered a content request. Handlers attach it as a response
/// extension; [`trace_content`] turns it into [`CONTENT_ORIGIN_HEADER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentOrigin {
    Cms,
    Catalog,
}

impl ContentOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cms => "cms",
            Self::Catalog => "catalog",
        }
    }
}

/// Cache namespace a route reads from, if any.
pub fn route_namespace(route: &str) -> Option<&'static str> {
    let mut segments = route.trim_start_matches('/').split('/');
    match (segments.next(), segments.next()) {
        (Some("api"), Some(BLOG_NAMESPACE)) => Some(BLOG_NAMESPACE),
        (Some("api"), Some(PROJECTS_NAMESPACE)) => Some(PROJECTS_NAMESPACE),
        _ => None,
    }
}

/// Trace each request by route template and content namespace. Failures are
/// logged with the diagnostic chain their handler attached.
pub async fn trace_content(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());
    let namespace = route_namespace(&route).unwrap_or("-");
    let started = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();

    let origin = response.extensions_mut().remove::<ContentOrigin>();
    if let Some(origin) = origin {
        response.headers_mut().insert(
            HeaderName::from_static(CONTENT_ORIGIN_HEADER),
            HeaderValue::from_static(origin.as_str()),
        );
    }
    let origin = origin.map_or("-", ContentOrigin::as_str);

    if !(status.is_client_error() || status.is_server_error()) {
        debug!(
            target = "folio::http",
            %method,
            route = %route,
            namespace,
            origin,
            status = status.as_u16(),
            elapsed_ms,
            "Served content request"
        );
        return response;
    }

    let chain = response
        .extensions_mut()
        .remove::<ErrorReport>()
        .map(|report| report.messages)
        .unwrap_or_default();
    let detail = chain.first().map_or("no diagnostic available", String::as_str);

    if status.is_server_error() {
        error!(
            target = "folio::http",
            %method,
            route = %route,
            namespace,
            status = status.as_u16(),
            elapsed_ms,
            detail,
            chain = ?chain,
            "Content request failed"
        );
    } else {
        warn!(
            target = "folio::http",
            %method,
            route = %route,
            namespace,
            status = status.as_u16(),
            elapsed_ms,
            detail,
            "Content request rejected"
        );
    }

    response
}
