//! Errors raised while loading a kubeconfig and resolving a connection from it.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KubeConfigError>;

#[derive(Debug, Error)]
pub enum KubeConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source is not a well-formed kubeconfig document.
    #[error("malformed kubeconfig: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A context was requested by name but the kubeconfig does not declare it.
    #[error("context \"{0}\" does not exist")]
    ContextNotFound(String),

    #[error("kubeconfig has no current context")]
    NoCurrentContext,

    #[error("cluster \"{0}\" does not exist")]
    ClusterNotFound(String),

    #[error("user \"{0}\" does not exist")]
    AuthInfoNotFound(String),

    #[error("cluster \"{0}\" has no server")]
    MissingServer(String),

    #[error("invalid server address {server:?}: {source}")]
    InvalidServer {
        server: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid proxy-url {proxy_url:?}: {source}")]
    InvalidProxyUrl {
        proxy_url: String,
        #[source]
        source: url::ParseError,
    },

    /// Member cluster names are path segments of the aggregated proxy URL.
    #[error("invalid member cluster name {0:?}")]
    InvalidMemberCluster(String),

    #[error("invalid base64 in {field}: {source}")]
    InvalidData {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },
}

impl KubeConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
