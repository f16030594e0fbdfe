/*
 * Responsibility
 * - GET /whoami: このリクエストで下流に転送される identity (匿名も可)
 * - GET /connection: 転送先の接続情報 (bearer token 必須)
 * - GET /clusters/{name}/connection: member cluster への接続情報 (aggregated proxy 経由)
 */
use axum::{Json, extract::Path};

use crate::api::v1::dto::connection::{ConnectionResponse, WhoAmIResponse};
use crate::api::v1::extractors::{
    AuthenticatedConfigExtractor, ForwardedConfig, ForwardedConfigExtractor,
};
use crate::error::AppError;

pub async fn whoami(
    ForwardedConfigExtractor(forwarded): ForwardedConfigExtractor,
) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse::from(&forwarded))
}

pub async fn connection(
    AuthenticatedConfigExtractor(forwarded): AuthenticatedConfigExtractor,
) -> Json<ConnectionResponse> {
    Json(ConnectionResponse::from(&forwarded))
}

pub async fn member_cluster_connection(
    AuthenticatedConfigExtractor(forwarded): AuthenticatedConfigExtractor,
    Path(name): Path<String>,
) -> Result<Json<ConnectionResponse>, AppError> {
    let member = forwarded
        .rest_config
        .for_member_cluster(&name)
        .map_err(|err| AppError::BadRequest(err.to_string()))?;
    Ok(Json(ConnectionResponse::from(&ForwardedConfig::new(member))))
}
