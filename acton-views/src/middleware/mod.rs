//! Middleware layers for acton-views
//!
//! Provides middleware for:
//! - Directory index routing (extensionless paths render `{dir}/index`, with
//!   a not-found view fallback)

pub mod static_index;

pub use static_index::{
    resolve_index, serve_index, IndexTarget, StaticIndexLayer, StaticIndexMiddleware,
};
