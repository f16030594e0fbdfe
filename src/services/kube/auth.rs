//! Inbound request headers → credential descriptor.
//!
//! Nothing here validates a token. Missing or malformed headers degrade to an
//! empty value, never to an error: the request is then forwarded as anonymous
//! and/or not impersonated.
//!
//! `http::HeaderName` is always lower-case, so the header constants below are the
//! lower-case forms of `Authorization`, `Impersonate-User`, `Impersonate-Group`
//! and `Impersonate-Extra-<key>`.

use axum::http::{HeaderMap, header};

use super::kubeconfig::AuthInfo;

pub const BEARER_PREFIX: &str = "Bearer ";
pub const IMPERSONATE_USER_HEADER: &str = "impersonate-user";
pub const IMPERSONATE_GROUP_HEADER: &str = "impersonate-group";
pub const IMPERSONATE_USER_EXTRA_HEADER: &str = "impersonate-extra-";

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

fn header_values(headers: &HeaderMap, name: &str) -> Vec<String> {
    headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// `true` only for `Authorization: Bearer <non-empty token>`. The scheme is case-sensitive.
pub fn has_authorization_header(headers: &HeaderMap) -> bool {
    authorization(headers)
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .is_some_and(|token| !token.is_empty())
}

/// Best-effort token text: strips `Bearer ` when present, otherwise returns the raw
/// header value. Absent header yields an empty string.
pub fn bearer_token(headers: &HeaderMap) -> String {
    authorization(headers)
        .map(|value| value.strip_prefix(BEARER_PREFIX).unwrap_or(value))
        .unwrap_or_default()
        .to_string()
}

/// Copy the impersonation headers onto `auth_info`.
///
/// - `Impersonate-User` always overwrites `impersonate` (`None` when absent/empty).
/// - `Impersonate-Group` replaces `impersonate_groups` only when at least one value is sent.
/// - each `Impersonate-Extra-<key>` sets `impersonate_user_extra[key]`; repeated lines of
///   the same key are merged in the order they were received.
pub fn handle_impersonation(auth_info: &mut AuthInfo, headers: &HeaderMap) {
    auth_info.impersonate = headers
        .get(IMPERSONATE_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|user| !user.is_empty())
        .map(str::to_string);

    let groups = header_values(headers, IMPERSONATE_GROUP_HEADER);
    if !groups.is_empty() {
        auth_info.impersonate_groups = groups;
    }

    for name in headers.keys() {
        let Some(key) = name.as_str().strip_prefix(IMPERSONATE_USER_EXTRA_HEADER) else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        let values = header_values(headers, name.as_str());
        if values.is_empty() {
            continue;
        }
        auth_info
            .impersonate_user_extra
            .insert(key.to_string(), values);
    }
}

/// Build the credential descriptor for one request.
///
/// Returns `None` unless the request carries a usable bearer token.
pub fn auth_info_from_request(headers: &HeaderMap) -> Option<AuthInfo> {
    if !has_authorization_header(headers) {
        return None;
    }

    let mut auth_info = AuthInfo {
        token: Some(bearer_token(headers)),
        ..AuthInfo::default()
    };
    handle_impersonation(&mut auth_info, headers);
    Some(auth_info)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::http::{HeaderName, HeaderValue};

    use super::*;

    fn with_authorization(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if !value.is_empty() {
            headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for &(name, value) in pairs {
            headers.append(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_static(value),
            );
        }
        headers
    }

    #[test]
    fn has_authorization_header_cases() {
        let cases = [
            ("valid bearer token", "Bearer my-token", true),
            ("missing bearer prefix", "my-token", false),
            ("empty header", "", false),
            ("bearer prefix only", "Bearer ", false),
            ("lower-case scheme", "bearer my-token", false),
            ("no space after scheme", "Bearermy-token", false),
            ("basic scheme", "Basic dXNlcjpwYXNz", false),
        ];

        for (name, value, expected) in cases {
            assert_eq!(
                has_authorization_header(&with_authorization(value)),
                expected,
                "{name}"
            );
        }
    }

    #[test]
    fn bearer_token_cases() {
        let cases = [
            ("valid bearer token", "Bearer my-secret-token", "my-secret-token"),
            ("missing bearer prefix", "my-secret-token", "my-secret-token"),
            ("empty header", "", ""),
            ("bearer prefix only", "Bearer ", ""),
        ];

        for (name, value, expected) in cases {
            assert_eq!(bearer_token(&with_authorization(value)), expected, "{name}");
        }
    }

    #[test]
    fn non_utf8_authorization_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
        );
        assert!(!has_authorization_header(&headers));
        assert_eq!(bearer_token(&headers), "");
    }

    #[test]
    fn user_impersonation() {
        let mut auth_info = AuthInfo::default();
        handle_impersonation(&mut auth_info, &headers(&[("Impersonate-User", "user1")]));

        assert_eq!(
            auth_info,
            AuthInfo {
                impersonate: Some("user1".into()),
                ..AuthInfo::default()
            }
        );
        assert!(auth_info.impersonate_groups.is_empty());
        assert!(auth_info.impersonate_user_extra.is_empty());
    }

    #[test]
    fn user_and_groups_impersonation_keeps_order() {
        let mut auth_info = AuthInfo::default();
        handle_impersonation(
            &mut auth_info,
            &headers(&[
                ("Impersonate-User", "user1"),
                ("Impersonate-Group", "group1"),
                ("Impersonate-Group", "group2"),
            ]),
        );

        assert_eq!(auth_info.impersonate.as_deref(), Some("user1"));
        assert_eq!(auth_info.impersonate_groups, vec!["group1", "group2"]);
        assert!(auth_info.impersonate_user_extra.is_empty());
    }

    #[test]
    fn user_and_extra_impersonation() {
        let mut auth_info = AuthInfo::default();
        handle_impersonation(
            &mut auth_info,
            &headers(&[
                ("Impersonate-User", "user1"),
                ("Impersonate-Extra-key1", "val1"),
                ("Impersonate-Extra-key1", "val2"),
            ]),
        );

        assert_eq!(auth_info.impersonate.as_deref(), Some("user1"));
        assert_eq!(
            auth_info.impersonate_user_extra,
            HashMap::from([("key1".to_string(), vec!["val1".to_string(), "val2".to_string()])])
        );
    }

    #[test]
    fn extra_keys_are_collected_per_suffix() {
        let mut auth_info = AuthInfo::default();
        handle_impersonation(
            &mut auth_info,
            &headers(&[
                ("Impersonate-Extra-scopes", "view"),
                ("Impersonate-Extra-reason", "on-call"),
                ("Impersonate-Extra-scopes", "edit"),
                ("Impersonate-Extra-", "ignored"),
                ("X-Impersonate-Extra-other", "ignored"),
            ]),
        );

        assert_eq!(auth_info.impersonate_user_extra.len(), 2);
        assert_eq!(auth_info.impersonate_user_extra["scopes"], vec!["view", "edit"]);
        assert_eq!(auth_info.impersonate_user_extra["reason"], vec!["on-call"]);
    }

    #[test]
    fn extra_key_without_readable_values_is_skipped() {
        let mut headers = headers(&[("Impersonate-Extra-scopes", "view")]);
        headers.append(
            HeaderName::from_static("impersonate-extra-k"),
            HeaderValue::from_bytes(b"\xffopaque").unwrap(),
        );

        let mut auth_info = AuthInfo::default();
        handle_impersonation(&mut auth_info, &headers);

        assert!(!auth_info.impersonate_user_extra.contains_key("k"));
        assert_eq!(auth_info.impersonate_user_extra["scopes"], vec!["view"]);
    }

    #[test]
    fn absent_groups_keep_caller_default() {
        let mut auth_info = AuthInfo {
            impersonate: Some("stale".into()),
            impersonate_groups: vec!["preset".into()],
            ..AuthInfo::default()
        };
        handle_impersonation(&mut auth_info, &HeaderMap::new());

        assert_eq!(auth_info.impersonate, None);
        assert_eq!(auth_info.impersonate_groups, vec!["preset"]);
        assert!(auth_info.impersonate_user_extra.is_empty());
    }

    #[test]
    fn no_auth_info_without_bearer_token() {
        assert!(auth_info_from_request(&headers(&[("Impersonate-User", "user1")])).is_none());
        assert!(auth_info_from_request(&with_authorization("Bearer ")).is_none());
    }

    #[test]
    fn auth_info_from_request_collects_everything() {
        let auth_info = auth_info_from_request(&headers(&[
            ("Authorization", "Bearer my-token"),
            ("Impersonate-User", "user1"),
            ("Impersonate-Group", "group1"),
            ("Impersonate-Extra-key1", "val1"),
        ]))
        .unwrap();

        assert_eq!(auth_info.token.as_deref(), Some("my-token"));
        assert_eq!(auth_info.impersonate.as_deref(), Some("user1"));
        assert_eq!(auth_info.impersonate_groups, vec!["group1"]);
        assert_eq!(auth_info.impersonate_user_extra["key1"], vec!["val1"]);
    }
}
