//! Routing module
//!
//! Decides which stored asset answers a request path:
//! - Legacy route table (fixed legacy → canonical rewrites)
//! - Routing policy (internal rewrite, or 301 into the pages directory)
//! - Default-document fallback when the store has nothing

mod policy;
mod router;
mod table;

pub use policy::{redirect_target, RouteDecision, RoutingPolicy};
pub use router::{EdgeRouter, Routed};
pub use table::RouteTable;
