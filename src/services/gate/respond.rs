//! The one place a gate denial becomes an HTTP response.
//!
//! Route and page handlers never hand-roll 401/403/redirect logic; they
//! pick a `Surface` and defer here. Keeping the table in a single module is
//! what makes the two surfaces behave identically.

use axum::response::{IntoResponse, Redirect, Response};

use crate::error::AppError;
use crate::services::gate::DenyReason;

/// Which kind of caller is being denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// JSON API: status code + error body.
    Api,
    /// Server-rendered page: redirect the browser to the next step.
    Page,
}

/// Translate a denial. `original_path` is where the caller was headed;
/// page logins bounce back there once the session exists.
pub fn deny(surface: Surface, reason: DenyReason, original_path: &str) -> Response {
    match (surface, reason) {
        (Surface::Api, DenyReason::Unauthenticated) => AppError::Unauthenticated.into_response(),
        (Surface::Api, DenyReason::EntitlementRequired) => {
            AppError::EntitlementRequired.into_response()
        }
        (Surface::Api, DenyReason::Forbidden) => AppError::Forbidden.into_response(),

        (Surface::Page, DenyReason::Unauthenticated) => {
            Redirect::to(&login_target(original_path)).into_response()
        }
        (Surface::Page, DenyReason::EntitlementRequired) => {
            Redirect::to("/payment").into_response()
        }
        // No admin-only pages exist today; if one appears, a flat 403 is
        // still the right answer (there is nowhere sensible to redirect).
        (Surface::Page, DenyReason::Forbidden) => AppError::Forbidden.into_response(),
    }
}

/// Upstream outage during gate evaluation. Identical on both surfaces: the
/// caller can only retry.
pub fn unavailable(_surface: Surface) -> Response {
    AppError::Upstream.into_response()
}

fn login_target(original_path: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(original_path.as_bytes()).collect();
    format!("/login?redirect={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header};

    fn location(resp: &Response) -> &str {
        resp.headers()
            .get(header::LOCATION)
            .expect("redirect must carry Location")
            .to_str()
            .unwrap()
    }

    #[test]
    fn api_denials_map_to_statuses() {
        assert_eq!(
            deny(Surface::Api, DenyReason::Unauthenticated, "/api/v1/thoughts").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            deny(Surface::Api, DenyReason::EntitlementRequired, "/api/v1/thoughts").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            deny(Surface::Api, DenyReason::Forbidden, "/api/v1/admin/users").status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn page_unauthenticated_redirects_to_login_with_return_path() {
        let resp = deny(Surface::Page, DenyReason::Unauthenticated, "/dashboard");
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/login?redirect=%2Fdashboard");
    }

    #[test]
    fn page_entitlement_redirects_to_payment() {
        let resp = deny(Surface::Page, DenyReason::EntitlementRequired, "/dashboard");
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/payment");
    }

    #[test]
    fn upstream_outage_is_503_on_both_surfaces() {
        assert_eq!(
            unavailable(Surface::Api).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            unavailable(Surface::Page).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
