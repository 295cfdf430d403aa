//! Contract harness library: the fixture format, the HTTP runner and
//! reporter, and the Docker orchestration used by managed runs.

pub mod config;
pub mod docker;
pub mod fixture;
pub mod reporter;
pub mod runner;
pub mod services;
