//! Per-service contract runners.

/// Connection strings for the managed test containers.
pub struct InfraUrls {
    pub database_url: String,
}

#[cfg(feature = "api")]
pub mod api;
