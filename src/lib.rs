//! Movie watch-list API: user registration/login with bearer tokens and
//! owner-scoped CRUD over each user's movies.

pub mod app;
pub mod auth;
pub mod clock;
pub mod config;
pub mod cors;
pub mod db;
pub mod error;
pub mod filmes;
pub mod json;
pub mod memory;
pub mod state;

pub use app::build_app;
pub use state::AppState;
