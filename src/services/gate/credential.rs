//! Session resolver: pull the credential off the request, push rotated
//! credentials back onto the response.
//!
//! A request carries its session either as `Authorization: Bearer <token>`
//! (API clients manage their own tokens, no refresh cookie) or as the
//! `t2a-access-token` / `t2a-refresh-token` cookie pair (browser flows).
//! Resolution never fails: a missing or garbled credential is the same as
//! "not logged in".

use axum::http::{HeaderMap, HeaderValue, header};

use crate::services::identity::RefreshedSession;

pub const ACCESS_COOKIE: &str = "t2a-access-token";
pub const REFRESH_COOKIE: &str = "t2a-refresh-token";

// Refresh tokens outlive access tokens by design; the provider revokes
// rotated ones server-side, so the cookie lifetime is just an upper bound.
const REFRESH_COOKIE_MAX_AGE_SECONDS: u64 = 30 * 24 * 3600;

/// The credential as carried by one request.
#[derive(Debug, Clone)]
pub struct SessionCredential {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Read the credential from request headers. Bearer wins over cookies so an
/// API client cannot be shadowed by a stale browser session on the same
/// origin.
pub fn from_headers(headers: &HeaderMap) -> Option<SessionCredential> {
    if let Some(token) = bearer_token(headers) {
        return Some(SessionCredential {
            access_token: token,
            refresh_token: None,
        });
    }

    let access_token = cookie_value(headers, ACCESS_COOKIE)?;
    Some(SessionCredential {
        access_token,
        refresh_token: cookie_value(headers, REFRESH_COOKIE),
    })
}

/// Write a rotated credential back as Set-Cookie headers. Called on every
/// response whose gate run refreshed the session, allowed or denied.
pub fn write_refreshed(headers: &mut HeaderMap, renewed: &RefreshedSession) {
    // A provider that omits expires_in must not produce Max-Age=0 (that
    // would delete the cookie we just rotated).
    let access_max_age = if renewed.expires_in == 0 {
        3600
    } else {
        renewed.expires_in
    };
    append_cookie(headers, ACCESS_COOKIE, &renewed.access_token, access_max_age);
    append_cookie(
        headers,
        REFRESH_COOKIE,
        &renewed.refresh_token,
        REFRESH_COOKIE_MAX_AGE_SECONDS,
    );
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn append_cookie(headers: &mut HeaderMap, name: &str, value: &str, max_age: u64) {
    let cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.append(header::SET_COOKIE, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn no_credential_resolves_to_none() {
        assert!(from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn garbled_authorization_header_resolves_to_none() {
        let map = headers(&[("authorization", "Basic dXNlcjpwdw==")]);
        assert!(from_headers(&map).is_none());
        let map = headers(&[("authorization", "Bearer ")]);
        assert!(from_headers(&map).is_none());
    }

    #[test]
    fn bearer_token_wins_over_cookies() {
        let map = headers(&[
            ("authorization", "Bearer api-token"),
            ("cookie", "t2a-access-token=cookie-token; t2a-refresh-token=rt"),
        ]);
        let cred = from_headers(&map).unwrap();
        assert_eq!(cred.access_token, "api-token");
        assert!(cred.refresh_token.is_none());
    }

    #[test]
    fn cookie_pair_is_resolved() {
        let map = headers(&[(
            "cookie",
            "theme=dark; t2a-access-token=at; t2a-refresh-token=rt",
        )]);
        let cred = from_headers(&map).unwrap();
        assert_eq!(cred.access_token, "at");
        assert_eq!(cred.refresh_token.as_deref(), Some("rt"));
    }

    #[test]
    fn access_cookie_alone_still_authenticates() {
        let map = headers(&[("cookie", "t2a-access-token=at")]);
        let cred = from_headers(&map).unwrap();
        assert_eq!(cred.access_token, "at");
        assert!(cred.refresh_token.is_none());
    }

    #[test]
    fn rotated_credential_becomes_set_cookie_headers() {
        let renewed = RefreshedSession {
            access_token: "new-at".to_string(),
            refresh_token: "new-rt".to_string(),
            expires_in: 3600,
        };
        let mut map = HeaderMap::new();
        write_refreshed(&mut map, &renewed);

        let cookies: Vec<_> = map
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("t2a-access-token=new-at;"));
        assert!(cookies[0].contains("Max-Age=3600"));
        assert!(cookies[1].starts_with("t2a-refresh-token=new-rt;"));
        assert!(cookies.iter().all(|c| c.contains("HttpOnly")));
    }
}
