//! Request handler module
//!
//! hyper entry point: method and size checks, health checks, then the edge
//! router, then the access log.

pub mod request;

pub use request::{handle_request, respond};
