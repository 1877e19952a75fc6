//! DropIQ API - shared wire types
//!
//! Everything that crosses the HTTP or WebSocket boundary: the response
//! envelope, request bodies and query strings, response payloads and the
//! realtime message protocol. Input types owned by the domain services are
//! re-exported so clients only need this crate.

pub mod envelope;
pub mod requests;
pub mod responses;
pub mod ws;

pub use envelope::ApiResponse;
pub use requests::*;
pub use responses::*;
pub use ws::{Channel, ClientMessage, ServerMessage};
