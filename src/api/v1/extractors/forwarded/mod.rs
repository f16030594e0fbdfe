/*!
 * Forwarded credential extractor
 *
 * Responsibility:
 * - middleware が組み立てた転送用 RestConfig を handler に渡す
 * - 型定義は types、axum 依存は core に分離する
 */

mod core;
mod types;

pub use self::core::{AuthenticatedConfigExtractor, ForwardedConfigExtractor};
pub use types::ForwardedConfig;
