//! Per-request credential forwarding.
//!
//! Reads `Authorization` / `Impersonate-*` headers, builds the `RestConfig` that a
//! downstream kube client should use for this request, and stores it in request
//! extensions as `ForwardedConfig`. Requests without a bearer token are forwarded
//! anonymously; this layer never rejects.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::ForwardedConfig;
use crate::services::kube::{AuthInfo, auth};
use crate::state::AppState;

/// ```ignore
/// let v1 = middleware::auth::forward::apply(v1, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, forward_middleware))
}

async fn forward_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let forwarded = match auth::auth_info_from_request(req.headers()) {
        Some(auth_info) => {
            tracing::debug!(
                impersonate = ?auth_info.impersonate,
                groups = auth_info.impersonate_groups.len(),
                extra_keys = auth_info.impersonate_user_extra.len(),
                "forwarding request credentials"
            );
            ForwardedConfig::new(state.rest_config.for_request(&auth_info))
        }
        None => {
            tracing::debug!("no bearer token on request, forwarding anonymously");
            ForwardedConfig::new(state.rest_config.for_request(&AuthInfo::default()))
        }
    };

    req.extensions_mut().insert(forwarded);
    next.run(req).await
}
