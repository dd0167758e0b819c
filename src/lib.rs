//! Edge router for a static community-association site.
//!
//! Maps request paths to stored assets: legacy routes are rewritten, bare
//! top-level paths are redirected into the pages directory, and anything
//! missing falls back to the default document.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
pub mod store;
