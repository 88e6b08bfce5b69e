pub mod auth;
pub mod rate_limit;
pub mod response;
pub mod validate_body;

pub use auth::jwt_auth_middleware;
pub use rate_limit::{rate_limit_middleware, RateLimiter, RouteClass, RouteLimit};
pub use response::{ApiResponse, ApiResult};
pub use validate_body::{RequiredFields, ValidatedJson};
