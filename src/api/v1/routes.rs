/*
 * Responsibility
 * - v1 URL structure
 * - Which subtrees sit behind the gate is decided here, nowhere else:
 *   /health is open; thoughts and admin are gated (admin handlers add the
 *   role sub-gate themselves, after the base gate)
 */
use axum::{Router, routing::get};

use crate::middleware;
use crate::state::AppState;

use crate::api::v1::handlers::{
    admin::{create_admin, list_users},
    health::health,
    thoughts::{create_thought, delete_thought, get_thought, list_thoughts, update_thought},
};

pub fn routes(state: AppState) -> Router<AppState> {
    let open = Router::new().route("/health", get(health));

    let gated = Router::new()
        .route("/thoughts", get(list_thoughts).post(create_thought))
        .route(
            "/thoughts/{thought_id}",
            get(get_thought).put(update_thought).delete(delete_thought),
        )
        .route("/admin/users", get(list_users).post(create_admin));
    let gated = middleware::auth::access::apply_api(gated, state);

    open.merge(gated)
}
