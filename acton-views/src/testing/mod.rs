//! Testing utilities for acton-views
//!
//! - [`TestServer`] - Wrapper around `axum-test` for middleware testing
//! - [`ViewFixture`] - Temporary views directory populated from strings
//! - Re-exported mockall-generated mocks for traits

pub mod fixture;
pub mod server;

pub use fixture::ViewFixture;
pub use server::TestServer;

pub use crate::source::MockViewSource;
