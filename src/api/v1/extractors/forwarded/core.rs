use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

use super::ForwardedConfig;

fn forwarded_config(parts: &Parts) -> Result<ForwardedConfig, AppError> {
    parts
        .extensions
        .get::<ForwardedConfig>()
        .cloned()
        .ok_or_else(|| {
            // forward middleware が route に掛かっていない
            tracing::error!("ForwardedConfig missing from request extensions");
            AppError::Internal
        })
}

/// Forwarded config, authenticated or anonymous.
pub struct ForwardedConfigExtractor(pub ForwardedConfig);

impl FromRequestParts<AppState> for ForwardedConfigExtractor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        forwarded_config(parts).map(ForwardedConfigExtractor)
    }
}

/// Forwarded config that carries a bearer token; 401 otherwise.
pub struct AuthenticatedConfigExtractor(pub ForwardedConfig);

impl FromRequestParts<AppState> for AuthenticatedConfigExtractor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let forwarded = forwarded_config(parts)?;
        if !forwarded.is_authenticated() {
            return Err(AppError::Unauthorized);
        }
        Ok(AuthenticatedConfigExtractor(forwarded))
    }
}
