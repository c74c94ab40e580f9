//! Cadence Server Library
//!
//! Multi-user music catalog server: albums and playlists with stable,
//! user-controlled song order.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod state;

// Re-export commonly used types for convenience
pub use api::router;
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use state::AppState;
