//! Gateway-side credential plumbing for kube API servers.
//!
//! - `services::kube`: kubeconfig loading and request header → credential mapping
//! - `middleware` / `api`: the axum boundary that forwards those credentials

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
