/*
 * Responsibility
 * - Config load → dependency construction → Router assembly → serve
 * - All process-level clients (pool, identity provider, gate) are built
 *   exactly once here and handed down through AppState
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repos::entitlement_repo::PgEntitlementRepo;
use crate::services::gate::Gate;
use crate::services::identity::HttpIdentityProvider;
use crate::state::AppState;
use crate::{api, middleware, web};

fn init_tracing() {
    // RUST_LOG wins when set.
    // Ex: RUST_LOG=info,t2a_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics through tracing; stderr can be hidden depending on
        // how the process is launched.
        tracing::error!(?info, "panic");

        if abort_on_panic {
            // Development: crash loudly so it gets noticed immediately.
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();

    let config = Config::from_env().context("loading configuration")?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting t2a-api in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .context("binding listener")?;
    axum::serve(listener, app).await.context("serving")?;

    Ok(())
}

fn build_state(config: &Config) -> Result<AppState> {
    // Lazy pool: the first query connects. Startup stays fast and a cold
    // database reads as UpstreamUnavailable per request, not a crash loop.
    let db = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(config.upstream_timeout)
        .connect_lazy(&config.database_url)
        .context("parsing DATABASE_URL")?;

    let identity = Arc::new(
        HttpIdentityProvider::new(config).context("building identity provider client")?,
    );
    let entitlements = Arc::new(PgEntitlementRepo::new(db.clone()));
    let gate = Arc::new(Gate::new(identity.clone(), entitlements));

    Ok(AppState::new(db, gate, identity))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .merge(web::routes(state.clone()))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    let router = middleware::cors::apply(router, config);
    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router)
}
