// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (JWT auth). Rate limiting applies to both tiers
// and is attached per route in `app.rs`.

pub mod dto;
pub mod protected;
pub mod public;
pub mod utils;

pub use protected::{comment_create, comment_delete, comment_like, post_create, post_delete, post_like};
pub use public::{health, post_show, posts_list, root};
