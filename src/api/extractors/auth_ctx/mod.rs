/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Types the auth middleware attaches to each request (SecurityCtx / AuthCtx)
 * - The extractor handlers use to require an authenticated principal
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 * - SecurityCtx
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::{AuthCtx, SecurityCtx};
