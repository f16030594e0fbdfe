/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config 読み込み → kubeconfig から RestConfig を解決 → Router 組み立て
 * - axum::serve() で起動
 */
use std::{panic, process};

use anyhow::{Context as _, Result};
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::Config;
use crate::middleware;
use crate::services::kube;
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG=info,kube_gateway=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development では即落として気付けるようにする
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    let rest_config =
        kube::load_rest_config(&config.kubeconfig_path, config.kube_context.as_deref())
            .with_context(|| {
                format!("loading kubeconfig {}", config.kubeconfig_path.display())
            })?;

    tracing::info!(
        env = ?config.app_env,
        addr = %config.addr,
        server = %rest_config.host,
        context = config.kube_context.as_deref().unwrap_or("<current>"),
        "starting gateway"
    );

    let app = middleware::http::apply(build_router(AppState::new(rest_config)), &config.http);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state)
}
