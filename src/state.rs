/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - 起動時に解決した RestConfig を保持する (リクエスト毎に変更しない)
 * - Clone 前提で持つ (内部は Arc)
 */
use std::sync::Arc;

use crate::services::kube::RestConfig;

#[derive(Clone, Debug)]
pub struct AppState {
    pub rest_config: Arc<RestConfig>,
}

impl AppState {
    pub fn new(rest_config: RestConfig) -> Self {
        Self {
            rest_config: Arc::new(rest_config),
        }
    }
}
