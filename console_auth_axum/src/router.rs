//! Combined router for all console authentication endpoints

use axum::Router;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Create a combined router for the passkey and token endpoints
///
/// Mount it under [`CONSOLE_AUTH_ROUTE_PREFIX`](crate::CONSOLE_AUTH_ROUTE_PREFIX):
/// - {CONSOLE_AUTH_ROUTE_PREFIX}/passkey/...
/// - {CONSOLE_AUTH_ROUTE_PREFIX}/token/...
///
/// Authorization headers are never recorded in the request spans.
pub fn console_auth_router() -> Router {
    console_auth_router_no_trace().layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as [`console_auth_router`] without the HTTP tracing middleware.
pub fn console_auth_router_no_trace() -> Router {
    Router::new()
        .nest("/passkey", super::passkey::router())
        .nest("/token", super::token::router())
}
