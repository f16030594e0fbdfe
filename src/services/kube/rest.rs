/*
 * Responsibility
 * - kubeconfig の current context から接続情報 (RestConfig) を解決する
 * - inbound request の AuthInfo を使って、転送用の RestConfig を作る
 * - token / key は Debug に出さない
 */
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use url::Url;

use super::error::{KubeConfigError, Result};
use super::kubeconfig::{AuthInfo, KubeConfig};

/// Path of the Karmada aggregated API that proxies to a member cluster:
/// `<host>/apis/cluster.karmada.io/v1alpha1/clusters/<name>/proxy/`.
const MEMBER_CLUSTER_PROXY_PATH: [&str; 4] =
    ["apis", "cluster.karmada.io", "v1alpha1", "clusters"];

/// Resolved connection to a kube API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestConfig {
    pub host: Url,
    pub proxy_url: Option<Url>,
    pub tls: TlsClientConfig,
    pub credentials: Credentials,
    pub impersonate: ImpersonationConfig,
    pub namespace: Option<String>,
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct TlsClientConfig {
    pub insecure: bool,
    pub server_name: Option<String>,
    pub ca_data: Option<Vec<u8>>,
    pub cert_data: Option<Vec<u8>>,
    pub key_data: Option<Vec<u8>>,
}

impl fmt::Debug for TlsClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsClientConfig")
            .field("insecure", &self.insecure)
            .field("server_name", &self.server_name)
            .field("has_ca", &self.ca_data.is_some())
            .field("has_client_cert", &self.cert_data.is_some())
            .field("has_client_key", &self.key_data.is_some())
            .finish()
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub bearer_token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.bearer_token.is_none() && self.username.is_none() && self.password.is_none()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("has_bearer_token", &self.bearer_token.is_some())
            .field("username", &self.username)
            .field("has_password", &self.password.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpersonationConfig {
    pub user_name: Option<String>,
    pub groups: Vec<String>,
    pub extra: HashMap<String, Vec<String>>,
}

impl ImpersonationConfig {
    pub fn is_empty(&self) -> bool {
        self.user_name.is_none() && self.groups.is_empty() && self.extra.is_empty()
    }
}

impl From<&AuthInfo> for ImpersonationConfig {
    fn from(auth_info: &AuthInfo) -> Self {
        Self {
            user_name: auth_info.impersonate.clone().filter(|u| !u.is_empty()),
            groups: auth_info.impersonate_groups.clone(),
            extra: auth_info.impersonate_user_extra.clone(),
        }
    }
}

impl RestConfig {
    /// Resolve the connection for `config.current_context`.
    pub fn from_kube_config(config: &KubeConfig) -> Result<Self> {
        let context_name = config.current_context.as_str();
        if context_name.is_empty() {
            return Err(KubeConfigError::NoCurrentContext);
        }

        let context = config
            .context(context_name)
            .ok_or_else(|| KubeConfigError::ContextNotFound(context_name.to_string()))?;
        let cluster = config
            .cluster(&context.cluster)
            .ok_or_else(|| KubeConfigError::ClusterNotFound(context.cluster.clone()))?;
        let auth_info = config
            .auth_info(&context.user)
            .ok_or_else(|| KubeConfigError::AuthInfoNotFound(context.user.clone()))?;

        if cluster.server.is_empty() {
            return Err(KubeConfigError::MissingServer(context.cluster.clone()));
        }
        let host = parse_server(&cluster.server)?;
        let proxy_url = cluster
            .proxy_url
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| {
                Url::parse(p).map_err(|source| KubeConfigError::InvalidProxyUrl {
                    proxy_url: p.to_string(),
                    source,
                })
            })
            .transpose()?;

        let tls = TlsClientConfig {
            insecure: cluster.insecure_skip_tls_verify,
            server_name: cluster.tls_server_name.clone(),
            ca_data: data_or_file(
                "certificate-authority-data",
                cluster.certificate_authority_data.as_deref(),
                cluster.certificate_authority.as_deref(),
            )?,
            cert_data: data_or_file(
                "client-certificate-data",
                auth_info.client_certificate_data.as_deref(),
                auth_info.client_certificate.as_deref(),
            )?,
            key_data: data_or_file(
                "client-key-data",
                auth_info.client_key_data.as_deref(),
                auth_info.client_key.as_deref(),
            )?,
        };

        let bearer_token = match (&auth_info.token, &auth_info.token_file) {
            (Some(token), _) if !token.is_empty() => Some(token.clone()),
            (_, Some(path)) => Some(read_token_file(path)?),
            _ => None,
        };

        Ok(Self {
            host,
            proxy_url,
            tls,
            credentials: Credentials {
                bearer_token,
                username: auth_info.username.clone(),
                password: auth_info.password.clone(),
            },
            impersonate: ImpersonationConfig::from(auth_info),
            namespace: context.namespace.clone(),
        })
    }

    /// Build the config used to forward one inbound request.
    ///
    /// Endpoint and server trust come from `self`; every piece of credential
    /// material (client certs, basic auth, token, impersonation) is replaced by
    /// what the request carried.
    pub fn for_request(&self, auth_info: &AuthInfo) -> Self {
        Self {
            host: self.host.clone(),
            proxy_url: self.proxy_url.clone(),
            tls: TlsClientConfig {
                insecure: self.tls.insecure,
                server_name: self.tls.server_name.clone(),
                ca_data: self.tls.ca_data.clone(),
                cert_data: None,
                key_data: None,
            },
            credentials: Credentials {
                bearer_token: auth_info.token.clone().filter(|t| !t.is_empty()),
                username: None,
                password: None,
            },
            impersonate: ImpersonationConfig::from(auth_info),
            namespace: self.namespace.clone(),
        }
    }

    /// Connection to a member cluster through the control plane's aggregated proxy.
    ///
    /// Endpoint becomes `<host>/apis/cluster.karmada.io/v1alpha1/clusters/<name>/proxy/`
    /// with `name` escaped as a single path segment. TLS trust, credentials and
    /// impersonation are those of `self`.
    pub fn for_member_cluster(&self, name: &str) -> Result<Self> {
        if matches!(name, "" | "." | "..") {
            return Err(KubeConfigError::InvalidMemberCluster(name.to_string()));
        }

        let mut host = self.host.clone();
        host.path_segments_mut()
            .map_err(|_| KubeConfigError::InvalidMemberCluster(name.to_string()))?
            .pop_if_empty()
            .extend(MEMBER_CLUSTER_PROXY_PATH)
            .push(name)
            .extend(["proxy", ""]);

        Ok(Self {
            host,
            ..self.clone()
        })
    }
}

fn parse_server(server: &str) -> Result<Url> {
    // kubeconfig allows a bare host:port, which means https
    let candidate = if server.contains("://") {
        server.to_string()
    } else {
        format!("https://{server}")
    };
    Url::parse(&candidate).map_err(|source| KubeConfigError::InvalidServer {
        server: server.to_string(),
        source,
    })
}

/// Inline base64 data wins over a file reference.
fn data_or_file(
    field: &'static str,
    data: Option<&str>,
    file: Option<&Path>,
) -> Result<Option<Vec<u8>>> {
    if let Some(data) = data.filter(|d| !d.is_empty()) {
        let decoded = STANDARD
            .decode(data.trim())
            .map_err(|source| KubeConfigError::InvalidData { field, source })?;
        return Ok(Some(decoded));
    }
    match file {
        Some(path) => fs::read(path)
            .map(Some)
            .map_err(|e| KubeConfigError::io(path, e)),
        None => Ok(None),
    }
}

fn read_token_file(path: &Path) -> Result<String> {
    let token = fs::read_to_string(path).map_err(|e| KubeConfigError::io(path, e))?;
    Ok(token.trim().to_string())
}
