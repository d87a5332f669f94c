/*
 * Responsibility
 * - Page-surface routes (/dashboard, /login, /payment)
 * - Bodies are deliberate placeholders; the interesting part is which
 *   routes sit behind the page gate and where denials redirect
 */
use axum::{Router, response::Html, routing::get};

use crate::api::v1::extractors::AuthCtxExtractor;
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/login", get(login))
        .route("/payment", get(payment));

    let gated = Router::new().route("/dashboard", get(dashboard));
    let gated = middleware::auth::access::apply_page(gated, state);

    open.merge(gated)
}

async fn dashboard(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Html<String> {
    Html(format!(
        "<!doctype html><title>Dashboard</title><h1>Dashboard</h1><p>Signed in as {}</p>",
        ctx.user.email
    ))
}

async fn login() -> Html<&'static str> {
    Html("<!doctype html><title>Log in</title><h1>Log in</h1>")
}

async fn payment() -> Html<&'static str> {
    Html("<!doctype html><title>Subscribe</title><h1>Subscribe to continue</h1>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::services::entitlement::SubscriptionStatus;
    use crate::test_support::{FakeIdentity, FakeStore, member, state_with};

    fn app(state: AppState) -> Router {
        routes(state.clone()).with_state(state)
    }

    #[tokio::test]
    async fn login_and_payment_pages_are_public() {
        for path in ["/login", "/payment"] {
            let state = state_with(FakeIdentity::default(), FakeStore::default());
            let resp = app(state)
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{path} should be public");
        }
    }

    #[tokio::test]
    async fn dashboard_requires_a_session() {
        let state = state_with(FakeIdentity::default(), FakeStore::default());
        let resp = app(state)
            .oneshot(Request::get("/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/login?redirect=%2Fdashboard"
        );
    }

    #[tokio::test]
    async fn dashboard_renders_for_a_subscribed_member() {
        let user = member();
        let identity = FakeIdentity::default().with_token("tok", user.clone());
        let store = FakeStore::default().with_status(user.id, SubscriptionStatus::Active);
        let state = state_with(identity, store);

        let resp = app(state)
            .oneshot(
                Request::get("/dashboard")
                    .header(header::COOKIE, "t2a-access-token=tok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }
}
