/*
 * Responsibility
 * - 環境変数の読み込み (PORT, APP_ENV, KUBECONFIG, KUBE_CONTEXT, HTTP_*)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
// gateway はヘッダしか読まないので body は小さくてよい
const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value
            .unwrap_or("development")
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Limits applied by `middleware::http`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub body_limit_bytes: usize,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub kubeconfig_path: PathBuf,
    // None = kubeconfig の current-context を使う
    pub kube_context: Option<String>,
    pub http: HttpSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => DEFAULT_PORT,
        };

        let addr = SocketAddr::from_str(&format!("0.0.0.0:{port}"))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let kubeconfig_path = match lookup("KUBECONFIG").filter(|s| !s.trim().is_empty()) {
            Some(path) => PathBuf::from(path.trim()),
            None => lookup("HOME")
                .map(|home| PathBuf::from(home).join(".kube").join("config"))
                .ok_or(ConfigError::Missing("KUBECONFIG"))?,
        };

        let kube_context = lookup("KUBE_CONTEXT")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let body_limit_bytes = match lookup("HTTP_BODY_LIMIT_BYTES") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("HTTP_BODY_LIMIT_BYTES"))?,
            None => DEFAULT_BODY_LIMIT_BYTES,
        };

        let request_timeout_seconds: u64 = match lookup("HTTP_TIMEOUT_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid("HTTP_TIMEOUT_SECONDS"))?,
            None => DEFAULT_REQUEST_TIMEOUT_SECONDS,
        };

        Ok(Self {
            addr,
            app_env,
            kubeconfig_path,
            kube_context,
            http: HttpSettings {
                body_limit_bytes,
                request_timeout: Duration::from_secs(request_timeout_seconds),
            },
        })
    }
}
