//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! The shopper identity is read per handler by the [`Shopper`] extractor.

pub mod request_id;
pub mod shopper;

pub use request_id::request_id_middleware;
pub use shopper::{SHOPPER_HEADER, Shopper};
