//! Typed kubeconfig model and loaders.
//!
//! Only the fields needed to reach a cluster are modelled; anything else in the
//! document (`preferences`, `extensions`, exec plugins, ...) is ignored.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use super::error::{KubeConfigError, Result};
use super::rest::RestConfig;

/// kubeconfig documents frequently carry `clusters: null`; treat that as empty.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubeConfig {
    #[serde(rename = "apiVersion", default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub clusters: Vec<NamedCluster>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contexts: Vec<NamedContext>,
    #[serde(rename = "users", default, deserialize_with = "null_as_default")]
    pub auth_infos: Vec<NamedAuthInfo>,
    #[serde(rename = "current-context", default, deserialize_with = "null_as_default")]
    pub current_context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    #[serde(default)]
    pub cluster: Cluster,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Cluster {
    #[serde(default)]
    pub server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_server_name: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub insecure_skip_tls_verify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedContext {
    pub name: String,
    #[serde(default)]
    pub context: Context,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedAuthInfo {
    pub name: String,
    #[serde(default)]
    pub user: AuthInfo,
}

/// Credential material for one kubeconfig user.
///
/// Also used as the per-request credential descriptor built from inbound headers
/// (see `services::kube::auth`), which is why the impersonation fields live here.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuthInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_certificate: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_certificate_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub impersonate: Option<String>,
    #[serde(
        rename = "as-groups",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub impersonate_groups: Vec<String>,
    #[serde(
        rename = "as-user-extra",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub impersonate_user_extra: HashMap<String, Vec<String>>,
}

impl fmt::Debug for AuthInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // token / password / key data は出さない
        f.debug_struct("AuthInfo")
            .field("client_certificate", &self.client_certificate)
            .field("client_key", &self.client_key)
            .field("has_token", &self.token.is_some())
            .field("token_file", &self.token_file)
            .field("username", &self.username)
            .field("impersonate", &self.impersonate)
            .field("impersonate_groups", &self.impersonate_groups)
            .field("impersonate_user_extra", &self.impersonate_user_extra)
            .finish_non_exhaustive()
    }
}

impl KubeConfig {
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        Ok(serde_yaml::from_slice(raw)?)
    }

    /// Read and parse a kubeconfig file.
    ///
    /// Relative file references (CA bundle, client cert/key, token file) are
    /// resolved against the directory holding the kubeconfig.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read(path).map_err(|e| KubeConfigError::io(path, e))?;
        let mut config = Self::from_slice(&raw)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts
            .iter()
            .find(|named| named.name == name)
            .map(|named| &named.context)
    }

    pub fn cluster(&self, name: &str) -> Option<&Cluster> {
        self.clusters
            .iter()
            .find(|named| named.name == name)
            .map(|named| &named.cluster)
    }

    pub fn auth_info(&self, name: &str) -> Option<&AuthInfo> {
        self.auth_infos
            .iter()
            .find(|named| named.name == name)
            .map(|named| &named.user)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut Option<PathBuf>| {
            if let Some(p) = path
                && p.is_relative()
            {
                *p = base.join(&*p);
            }
        };

        for named in &mut self.clusters {
            resolve(&mut named.cluster.certificate_authority);
        }
        for named in &mut self.auth_infos {
            resolve(&mut named.user.client_certificate);
            resolve(&mut named.user.client_key);
            resolve(&mut named.user.token_file);
        }
    }
}

/// Where a kubeconfig comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KubeConfigSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl KubeConfigSource {
    pub fn load(&self) -> Result<KubeConfig> {
        match self {
            Self::Bytes(raw) => KubeConfig::from_slice(raw),
            Self::Path(path) => KubeConfig::from_path(path),
        }
    }
}

/// Parse raw kubeconfig bytes and resolve a connection for its current context.
pub fn load_rest_config_from_kubeconfig(raw: impl AsRef<[u8]>) -> Result<RestConfig> {
    let config = KubeConfig::from_slice(raw.as_ref())?;
    RestConfig::from_kube_config(&config)
}

/// Load the kubeconfig at `path`, optionally switching its current context.
///
/// `None` (or an empty name) keeps the current context declared in the file.
/// A named context must exist in the file, otherwise `ContextNotFound` is returned.
/// The file itself is never rewritten.
pub fn load_api_config(path: impl AsRef<Path>, context_name: Option<&str>) -> Result<KubeConfig> {
    let mut config = KubeConfig::from_path(path)?;

    if let Some(name) = context_name.filter(|name| !name.is_empty()) {
        if config.context(name).is_none() {
            return Err(KubeConfigError::ContextNotFound(name.to_string()));
        }
        config.current_context = name.to_string();
    }

    Ok(config)
}

/// `load_api_config` followed by connection resolution; used at startup.
pub fn load_rest_config(path: impl AsRef<Path>, context_name: Option<&str>) -> Result<RestConfig> {
    let config = load_api_config(path, context_name)?;
    RestConfig::from_kube_config(&config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SINGLE_CONTEXT: &str = r#"
apiVersion: v1
clusters:
- cluster:
    server: https://localhost:6443
  name: test
contexts:
- context:
    cluster: test
    user: test
  name: test
current-context: test
kind: Config
preferences: {}
users:
- name: test
  user:
    token: test-token
"#;

    const TWO_CONTEXTS: &str = r#"
apiVersion: v1
clusters:
- cluster:
    server: https://localhost:6443
  name: test-cluster
- cluster:
    server: https://staging.example.com
    certificate-authority: certs/ca.crt
  name: staging-cluster
contexts:
- context:
    cluster: test-cluster
    user: test-user
  name: test-context
- context:
    cluster: staging-cluster
    user: staging-user
    namespace: karmada-system
  name: staging-context
current-context: test-context
kind: Config
users:
- name: test-user
  user:
    token: secret
- name: staging-user
  user:
    token-file: tokens/staging
"#;

    fn write_kubeconfig(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn rest_config_from_valid_kubeconfig() {
        let config = load_rest_config_from_kubeconfig(SINGLE_CONTEXT).unwrap();
        assert_eq!(config.host.as_str(), "https://localhost:6443/");
        assert_eq!(config.credentials.bearer_token.as_deref(), Some("test-token"));
    }

    #[test]
    fn rest_config_from_invalid_kubeconfig_fails() {
        let err = load_rest_config_from_kubeconfig("invalid content").unwrap_err();
        assert!(matches!(err, KubeConfigError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn api_config_uses_declared_current_context() {
        let dir = TempDir::new().unwrap();
        let path = write_kubeconfig(&dir, TWO_CONTEXTS);

        assert_eq!(load_api_config(&path, None).unwrap().current_context, "test-context");
        assert_eq!(load_api_config(&path, Some("")).unwrap().current_context, "test-context");
    }

    #[test]
    fn api_config_switches_to_requested_context() {
        let dir = TempDir::new().unwrap();
        let path = write_kubeconfig(&dir, TWO_CONTEXTS);

        let config = load_api_config(&path, Some("test-context")).unwrap();
        assert_eq!(config.current_context, "test-context");

        let config = load_api_config(&path, Some("staging-context")).unwrap();
        assert_eq!(config.current_context, "staging-context");
    }

    #[test]
    fn api_config_rejects_unknown_context() {
        let dir = TempDir::new().unwrap();
        let path = write_kubeconfig(&dir, TWO_CONTEXTS);

        let err = load_api_config(&path, Some("non-existent")).unwrap_err();
        assert!(matches!(err, KubeConfigError::ContextNotFound(ref name) if name == "non-existent"));
    }

    #[test]
    fn api_config_does_not_rewrite_file() {
        let dir = TempDir::new().unwrap();
        let path = write_kubeconfig(&dir, TWO_CONTEXTS);

        load_api_config(&path, Some("staging-context")).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), TWO_CONTEXTS);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_api_config(dir.path().join("absent"), None).unwrap_err();
        assert!(matches!(err, KubeConfigError::Io { .. }));
    }

    #[test]
    fn relative_references_resolve_against_kubeconfig_dir() {
        let dir = TempDir::new().unwrap();
        let path = write_kubeconfig(&dir, TWO_CONTEXTS);

        let config = KubeConfig::from_path(&path).unwrap();
        let cluster = config.cluster("staging-cluster").unwrap();
        assert_eq!(
            cluster.certificate_authority.as_deref(),
            Some(dir.path().join("certs/ca.crt").as_path())
        );
        let user = config.auth_info("staging-user").unwrap();
        assert_eq!(
            user.token_file.as_deref(),
            Some(dir.path().join("tokens/staging").as_path())
        );
    }

    #[test]
    fn load_rest_config_reads_token_file_for_selected_context() {
        let dir = TempDir::new().unwrap();
        let path = write_kubeconfig(&dir, TWO_CONTEXTS);
        fs::create_dir_all(dir.path().join("certs")).unwrap();
        fs::write(dir.path().join("certs/ca.crt"), b"ca-bundle").unwrap();
        fs::create_dir_all(dir.path().join("tokens")).unwrap();
        fs::write(dir.path().join("tokens/staging"), "staging-token\n").unwrap();

        let config = load_rest_config(&path, Some("staging-context")).unwrap();
        assert_eq!(config.host.as_str(), "https://staging.example.com/");
        assert_eq!(config.credentials.bearer_token.as_deref(), Some("staging-token"));
        assert_eq!(config.tls.ca_data.as_deref(), Some(b"ca-bundle".as_slice()));
        assert_eq!(config.namespace.as_deref(), Some("karmada-system"));
    }

    #[test]
    fn null_sections_parse_as_empty() {
        let config = KubeConfig::from_slice(
            b"apiVersion: v1\nkind: Config\nclusters: null\ncontexts: null\nusers: null\ncurrent-context: \"\"\n",
        )
        .unwrap();
        assert!(config.clusters.is_empty());
        assert!(config.contexts.is_empty());
        assert!(config.auth_infos.is_empty());
        assert!(config.current_context.is_empty());
    }

    #[test]
    fn source_loads_from_bytes_and_path() {
        let dir = TempDir::new().unwrap();
        let path = write_kubeconfig(&dir, SINGLE_CONTEXT);

        let from_bytes = KubeConfigSource::Bytes(SINGLE_CONTEXT.as_bytes().to_vec())
            .load()
            .unwrap();
        let from_path = KubeConfigSource::Path(path).load().unwrap();
        assert_eq!(from_bytes, from_path);
        assert_eq!(from_bytes.current_context, "test");
    }

    #[test]
    fn impersonation_fields_use_kubeconfig_names() {
        let config = KubeConfig::from_slice(
            br#"
users:
- name: admin
  user:
    token: abc
    as: jane
    as-groups: [devs]
    as-user-extra:
      scopes: [view]
"#,
        )
        .unwrap();
        let user = config.auth_info("admin").unwrap();
        assert_eq!(user.impersonate.as_deref(), Some("jane"));
        assert_eq!(user.impersonate_groups, vec!["devs".to_string()]);
        assert_eq!(user.impersonate_user_extra["scopes"], vec!["view".to_string()]);
    }

    #[test]
    fn proxy_url_is_kept_and_resolved() {
        let raw = r#"
clusters:
- name: behind-proxy
  cluster:
    server: https://member1.example.com:6443
    proxy-url: http://corp-proxy:3128
contexts:
- name: behind-proxy
  context:
    cluster: behind-proxy
    user: admin
users:
- name: admin
  user:
    token: abc
current-context: behind-proxy
"#;
        let config = KubeConfig::from_slice(raw.as_bytes()).unwrap();
        let cluster = config.cluster("behind-proxy").unwrap();
        assert_eq!(cluster.proxy_url.as_deref(), Some("http://corp-proxy:3128"));

        let reparsed = KubeConfig::from_slice(serde_yaml::to_string(&config).unwrap().as_bytes())
            .unwrap();
        assert_eq!(reparsed, config);

        let rest = load_rest_config_from_kubeconfig(raw).unwrap();
        assert_eq!(
            rest.proxy_url.as_ref().map(|u| u.as_str()),
            Some("http://corp-proxy:3128/")
        );
    }

    #[test]
    fn auth_info_debug_hides_secrets() {
        let info = AuthInfo {
            token: Some("super-secret".into()),
            password: Some("hunter2".into()),
            ..AuthInfo::default()
        };
        let rendered = format!("{info:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("hunter2"));
    }
}
