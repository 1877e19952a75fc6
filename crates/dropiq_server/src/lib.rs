//! DropIQ HTTP server.
//!
//! Exposes the core services as a JSON API (every response wrapped in the
//! `{ success, data | error }` envelope) plus a WebSocket channel for
//! security alerts. The binary in `main.rs` handles configuration and
//! logging; everything here is constructible in-process for tests.

pub mod app;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use app::create_app;
pub use error::{AppError, ServerError, ServerResult};
pub use state::{AppState, Providers};
