/*!
 * Authenticated-context extractor
 *
 * The gate middleware evaluates the request and stores an `AuthCtx` in the
 * request extensions; handlers receive it through this extractor. The type
 * itself lives with the gate (services::gate::AuthCtx); this module only
 * owns the axum plumbing.
 */

mod core;

pub use core::AuthCtxExtractor;
