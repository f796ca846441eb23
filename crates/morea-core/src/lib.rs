//! Shared web plumbing for the MOREA service: health endpoints,
//! request-id middleware, timestamp serialization, and tracing setup.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
