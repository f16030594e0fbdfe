/*
 * Responsibility
 * - 転送用接続情報のレスポンス DTO
 * - token / 鍵などの秘密情報は含めない (有無だけ返す)
 */
use std::collections::HashMap;

use serde::Serialize;

use crate::api::v1::extractors::ForwardedConfig;

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub server: String,
    pub authenticated: bool,
    pub impersonate: ImpersonationDto,
}

#[derive(Debug, Default, Serialize)]
pub struct ImpersonationDto {
    pub user: Option<String>,
    pub groups: Vec<String>,
    pub extra: HashMap<String, Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    pub server: String,
    pub namespace: Option<String>,
    pub proxy_url: Option<String>,
    pub tls: TlsDto,
}

#[derive(Debug, Serialize)]
pub struct TlsDto {
    pub insecure: bool,
    pub server_name: Option<String>,
    pub has_ca: bool,
}

impl From<&ForwardedConfig> for WhoAmIResponse {
    fn from(forwarded: &ForwardedConfig) -> Self {
        let rest = &forwarded.rest_config;
        Self {
            server: rest.host.to_string(),
            authenticated: forwarded.is_authenticated(),
            impersonate: ImpersonationDto {
                user: rest.impersonate.user_name.clone(),
                groups: rest.impersonate.groups.clone(),
                extra: rest.impersonate.extra.clone(),
            },
        }
    }
}

impl From<&ForwardedConfig> for ConnectionResponse {
    fn from(forwarded: &ForwardedConfig) -> Self {
        let rest = &forwarded.rest_config;
        Self {
            server: rest.host.to_string(),
            namespace: rest.namespace.clone(),
            proxy_url: rest.proxy_url.as_ref().map(|url| url.to_string()),
            tls: TlsDto {
                insecure: rest.tls.insecure,
                server_name: rest.tls.server_name.clone(),
                has_ca: rest.tls.ca_data.is_some(),
            },
        }
    }
}
