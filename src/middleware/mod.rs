//! Middleware module
//!
//! Custom middleware for authentication, request logging, and hit counting.

mod auth;
mod hits;
mod logging;

pub use auth::{AuthMiddleware, AuthenticatedUser};
pub use hits::{CountHits, SiteHits};
pub use logging::RequestLogger;
