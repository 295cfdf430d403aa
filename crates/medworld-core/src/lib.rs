//! Cross-cutting service plumbing: tracing setup, request-id and trace
//! layers, health endpoints, and shared serialization helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
