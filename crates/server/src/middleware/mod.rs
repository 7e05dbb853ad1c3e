//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session gates, on the admin and cart routes only

pub mod gate;
pub mod request_id;

pub use gate::{AuthenticatedUser, GateRejection, SESSION_COOKIE, admin_gate, user_gate};
pub use request_id::request_id_middleware;
