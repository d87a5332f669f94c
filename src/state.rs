/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Everything here is built once at startup and injected; handlers and
 *   middleware never construct their own clients
 */
use std::sync::Arc;

use crate::services::gate::Gate;
use crate::services::identity::IdentityProvider;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub gate: Arc<Gate>,
    /// Direct provider handle for the admin-provisioning handlers; the gate
    /// holds its own reference for identity resolution.
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, gate: Arc<Gate>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { db, gate, identity }
    }
}
