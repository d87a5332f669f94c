/*
 * Responsibility
 * - Extractors handlers use to receive request context
 */
mod auth_ctx;

pub use auth_ctx::AuthCtxExtractor;
