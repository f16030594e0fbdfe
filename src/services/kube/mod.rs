/*
 * Responsibility
 * - kube API への接続情報を組み立てる core (HTTP サーバには依存しない)
 * - auth: リクエストヘッダ → AuthInfo (bearer token / impersonation)
 * - kubeconfig: kubeconfig の読み込みと context 選択
 * - rest: 選択された context から RestConfig (endpoint + credentials) を作る
 */
pub mod auth;
pub mod error;
pub mod kubeconfig;
pub mod rest;

pub use auth::{auth_info_from_request, bearer_token, handle_impersonation, has_authorization_header};
pub use error::KubeConfigError;
pub use kubeconfig::{
    AuthInfo, Cluster, Context, KubeConfig, KubeConfigSource, load_api_config, load_rest_config,
    load_rest_config_from_kubeconfig,
};
pub use rest::RestConfig;
