//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span and latency)
//! 3. Request ID (reuse or generate `x-request-id`, recorded on the span)
//! 4. CORS (permissive, the API is consumed from a separate frontend origin)
//! 5. Security headers

pub mod auth;
pub mod request_id;
pub mod security_headers;

pub use auth::{BEARER_PREFIX, RequireSession};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
