pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notify;
pub mod state;

pub use app::build_router;
pub use state::{AppState, ForumSettings};
