/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - forward middleware が必要な範囲をここで決める (/health は対象外)
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{
    connection::{connection, member_cluster_connection, whoami},
    health::health,
};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let forwarded = Router::new()
        .route("/whoami", get(whoami))
        .route("/connection", get(connection))
        .route("/clusters/{name}/connection", get(member_cluster_connection));
    let forwarded = middleware::auth::forward::apply(forwarded, state);

    Router::new().route("/health", get(health)).merge(forwarded)
}
