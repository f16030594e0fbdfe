/*
 * Responsibility
 * - middleware → handler に受け渡す「転送用接続情報」の型
 * - token の検証はしない (ここでは有無だけ見る)
 */
use crate::services::kube::RestConfig;

/// Connection a downstream kube client should use for the current request.
#[derive(Debug, Clone)]
pub struct ForwardedConfig {
    pub rest_config: RestConfig,
}

impl ForwardedConfig {
    pub fn new(rest_config: RestConfig) -> Self {
        Self { rest_config }
    }

    pub fn is_authenticated(&self) -> bool {
        self.rest_config.credentials.bearer_token.is_some()
    }
}
