//! HAOC Navigation
//!
//! - `evaluate` is the route guard: a pure decision over a `Session` and an
//!   optional required role
//! - `RouteTable` maps paths (with `:param` segments) to their access level
//! - `Navigator` combines the two: a path plus the current session yields
//!   the page to render, a redirect, a loading screen or not-found
//!
//! Guards never fetch anything. Re-validating the session is the caller's
//! job; navigation is re-evaluated on each state change.

mod error;
mod guard;
mod navigator;
mod route;

pub use error::NavigationError;
pub use guard::{evaluate, Decision, LOGIN_PATH, UNAUTHORIZED_PATH};
pub use navigator::{Navigation, Navigator};
pub use route::{Access, Params, Route, RouteTable};

pub type Result<T> = std::result::Result<T, NavigationError>;
