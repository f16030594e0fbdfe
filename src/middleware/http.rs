//! HTTP-level middleware applied to every route.
//!
//! Limits come from `Config` (`HTTP_BODY_LIMIT_BYTES`, `HTTP_TIMEOUT_SECONDS`);
//! call sites only hand over `HttpSettings`.

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::{StatusCode, header::HeaderName};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::HttpSettings;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn error_status(err: &BoxError) -> StatusCode {
    if err.is::<tower::timeout::error::Elapsed>() {
        StatusCode::REQUEST_TIMEOUT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub fn apply(router: Router, settings: &HttpSettings) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    // span / response log に request id が載るよう、id 付与より内側に置く
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let layers = ServiceBuilder::new()
        // timeout 等の BoxError を status に落として Infallible にする
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            error_status(&err)
        }))
        // 無ければ生成し、レスポンスにも返す
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(RequestBodyLimitLayer::new(settings.body_limit_bytes))
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(trace);

    router.layer(layers)
}
