//! Gate middleware: credential resolution → gate evaluation → AuthCtx in
//! request extensions.
//!
//! The same evaluation runs for both surfaces; only the denial rendering
//! differs (JSON error vs. redirect), and that mapping lives in
//! `gate::respond`. Handlers behind this middleware receive `AuthCtx` via
//! the extractor and never re-check authentication themselves.
//!
//! When the gate rotated the session during evaluation, the new cookie pair
//! is written onto the response whatever the outcome was; a user bounced
//! to /payment is still logged in.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::services::gate::credential;
use crate::services::gate::respond::{self, Surface};
use crate::services::gate::GateOutcome;
use crate::state::AppState;

/// Protect an API subtree: denials are JSON errors.
pub fn apply_api(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, api_gate))
}

/// Protect a page subtree: denials are redirects.
pub fn apply_page(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, page_gate))
}

async fn api_gate(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    run_gate(state, Surface::Api, req, next).await
}

async fn page_gate(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    run_gate(state, Surface::Page, req, next).await
}

async fn run_gate(
    state: AppState,
    surface: Surface,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let credential = credential::from_headers(req.headers());

    let evaluation = match state.gate.evaluate(credential).await {
        Ok(evaluation) => evaluation,
        Err(err) => {
            tracing::error!(error = %err, path = %path, "gate evaluation failed upstream");
            return respond::unavailable(surface);
        }
    };

    let refreshed = evaluation.refreshed;
    let mut response = match evaluation.outcome {
        GateOutcome::Allow(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        GateOutcome::Deny(reason) => {
            tracing::debug!(reason = reason.code(), path = %path, "gate denied request");
            respond::deny(surface, reason, &path)
        }
    };

    if let Some(renewed) = refreshed {
        credential::write_refreshed(response.headers_mut(), &renewed);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header};
    use axum::routing::get;
    use axum::{Extension, Json};
    use tower::ServiceExt;

    use crate::services::entitlement::SubscriptionStatus;
    use crate::services::gate::AuthCtx;
    use crate::services::identity::RefreshedSession;
    use crate::test_support::{FakeIdentity, FakeStore, admin, member, state_with};

    async fn whoami(Extension(ctx): Extension<AuthCtx>) -> Json<serde_json::Value> {
        Json(serde_json::json!({ "id": ctx.user.id }))
    }

    async fn page() -> &'static str {
        "rendered"
    }

    fn api_app(state: AppState) -> Router {
        let gated = Router::new().route("/whoami", get(whoami));
        apply_api(gated, state.clone()).with_state(state)
    }

    fn page_app(state: AppState) -> Router {
        let gated = Router::new().route("/dashboard", get(page));
        apply_page(gated, state.clone()).with_state(state)
    }

    fn get_req(path: &str, headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::get(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn anonymous_api_call_gets_401_json() {
        let state = state_with(FakeIdentity::default(), FakeStore::default());
        let resp = api_app(state)
            .oneshot(get_req("/whoami", &[]))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(resp).await;
        assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn anonymous_page_request_redirects_to_login_with_return_path() {
        let state = state_with(FakeIdentity::default(), FakeStore::default());
        let resp = page_app(state)
            .oneshot(get_req("/dashboard", &[]))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/login?redirect=%2Fdashboard"
        );
    }

    #[tokio::test]
    async fn unsubscribed_member_is_sent_to_payment_page() {
        let user = member();
        let identity = FakeIdentity::default().with_token("tok", user);
        let state = state_with(identity, FakeStore::default());

        let resp = page_app(state)
            .oneshot(get_req("/dashboard", &[("authorization", "Bearer tok")]))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/payment");
    }

    #[tokio::test]
    async fn subscribed_member_reaches_the_page() {
        let user = member();
        let identity = FakeIdentity::default().with_token("tok", user.clone());
        let store = FakeStore::default().with_status(user.id, SubscriptionStatus::Active);
        let state = state_with(identity, store);

        let resp = page_app(state)
            .oneshot(get_req("/dashboard", &[("authorization", "Bearer tok")]))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn subscribed_member_reaches_the_api_with_identity_attached() {
        let user = member();
        let identity = FakeIdentity::default().with_token("tok", user.clone());
        let store = FakeStore::default().with_status(user.id, SubscriptionStatus::Active);
        let state = state_with(identity, store);

        let resp = api_app(state)
            .oneshot(get_req("/whoami", &[("authorization", "Bearer tok")]))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["id"], serde_json::json!(user.id));
    }

    #[tokio::test]
    async fn admin_without_entitlement_row_is_allowed() {
        let user = admin();
        let identity = FakeIdentity::default().with_token("tok", user);
        let state = state_with(identity, FakeStore::default());

        let resp = api_app(state)
            .oneshot(get_req("/whoami", &[("authorization", "Bearer tok")]))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn provider_outage_surfaces_as_503_with_reason() {
        let state = state_with(FakeIdentity::default().offline(), FakeStore::default());
        let resp = api_app(state)
            .oneshot(get_req("/whoami", &[("authorization", "Bearer tok")]))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(resp).await;
        assert_eq!(body["error"]["code"], "UPSTREAM_UNAVAILABLE");
    }

    #[tokio::test]
    async fn expired_cookie_session_is_refreshed_and_cookies_rotate() {
        let user = member();
        let renewed = RefreshedSession {
            access_token: "fresh".to_string(),
            refresh_token: "rt2".to_string(),
            expires_in: 3600,
        };
        let identity = FakeIdentity::default()
            .with_token("fresh", user.clone())
            .with_refresh("rt1", renewed);
        let store = FakeStore::default().with_status(user.id, SubscriptionStatus::Active);
        let state = state_with(identity, store);

        let resp = page_app(state)
            .oneshot(get_req(
                "/dashboard",
                &[("cookie", "t2a-access-token=stale; t2a-refresh-token=rt1")],
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let cookies: Vec<_> = resp
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert!(cookies.iter().any(|c| c.starts_with("t2a-access-token=fresh;")));
        assert!(cookies.iter().any(|c| c.starts_with("t2a-refresh-token=rt2;")));
    }
}
