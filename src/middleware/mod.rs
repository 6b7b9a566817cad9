pub mod auth;
pub mod response;
pub mod validate;

pub use auth::{AuthUser, DbPool};
pub use response::{ApiResponse, ApiResult};
pub use validate::ValidatedJson;
