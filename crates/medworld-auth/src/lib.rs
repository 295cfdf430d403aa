//! Session-token plumbing: the opaque token codec, the session cookie
//! builder, and the authenticated-principal extractor.
//!
//! The API service resolves tokens against the database; this crate only
//! defines the formats and the request-side types, so tests and the
//! contract harness can share them without pulling in sea-orm.

pub mod cookie;
pub mod principal;
pub mod token;
