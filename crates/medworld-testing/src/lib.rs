//! Test utilities for the MedWorld API.
//!
//! Provides credential header builders, the contract fixture loader, and
//! canonical seed identities. Import in `#[cfg(test)]` blocks and the
//! contract harness only — never in production code.

pub mod auth;
pub mod fixture;
