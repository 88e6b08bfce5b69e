// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Read-only forum endpoints plus the service banner and health probe.
// Post reads go through the general rate limit; `/` and `/health` do not.

pub mod posts;
pub mod system;

pub use posts::list as posts_list;
pub use posts::show as post_show;
pub use system::health;
pub use system::root;
