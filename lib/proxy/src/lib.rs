//! Reverse-proxy layer of the wicket gateway.
//!
//! A [`RouteTable`] is an immutable, specificity-ordered list of path
//! patterns built once at startup; the [`Forwarder`] relays a matched
//! request to the route's backend verbatim. Neither half knows anything
//! about authentication.

pub mod error;
pub mod forward;
pub mod route;

pub use error::{ProxyError, RouteTableError};
pub use forward::{ForwardedResponse, Forwarder};
pub use route::{Route, RouteDef, RouteTable};
