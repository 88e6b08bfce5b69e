// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here runs behind `jwt_auth_middleware`, so handlers take the
// caller `Identity` as an extractor. Deletes additionally check ownership.

pub mod comments;
pub mod posts;

pub use comments::create as comment_create;
pub use comments::delete as comment_delete;
pub use comments::like as comment_like;
pub use posts::create as post_create;
pub use posts::delete as post_delete;
pub use posts::like as post_like;
