//! Stateless bearer-token authentication service.
//!
//! HS256 tokens are issued at login/registration, verified on every request by
//! the access middleware, and refreshed only after they expire.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
