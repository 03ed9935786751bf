pub mod auth;
pub mod normalize;
pub mod response;
pub mod validate;

pub use auth::{require_auth, AuthSettings, AuthUser};
pub use normalize::{normalize_errors, ErrorPolicy};
pub use response::{ApiResponse, ApiResult};
pub use validate::Validated;
