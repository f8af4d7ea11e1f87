/*!
 * Authenticated request context
 *
 * Responsibility:
 * - access middleware が作った AuthCtx を handler に渡す
 * - axum 依存 (FromRequestParts) は core、データ型は types
 */

mod core;
mod types;

pub use self::core::AuthCtxExtractor;
pub use self::types::AuthCtx;
