//! HTTP protocol layer module
//!
//! Response builders, conditional-request handling and MIME detection,
//! kept independent of routing decisions.

pub mod cache;
pub mod mime;
pub mod response;

pub use cache::CachePolicy;
pub use response::{
    build_304_response, build_405_response, build_413_response, build_asset_response,
    build_health_response, build_options_response, build_redirect_response,
};
