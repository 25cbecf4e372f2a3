//! Axum extractors
//!
//! [`RequestState`] runs the engine's request-state function so handlers can
//! render views with the same base state the directory index middleware uses.
//!
//! ```rust,no_run
//! use acton_views::prelude::*;
//! use axum::{extract::State, http::StatusCode, response::Response};
//! use serde_json::json;
//!
//! async fn hello(State(views): State<ViewEngine>, RequestState(state): RequestState) -> Response {
//!     let options = RenderOptions::with_data(json!({"name": "world"})).state(state);
//!     views.render_response("hello/index", options, StatusCode::OK).await
//! }
//! ```

use crate::engine::ViewEngine;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use serde_json::{Map, Value};
use std::convert::Infallible;

/// Base state built for the current request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestState(pub Map<String, Value>);

impl<S> FromRequestParts<S> for RequestState
where
    ViewEngine: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let engine = ViewEngine::from_ref(state);
        Ok(Self(engine.request_state(parts)))
    }
}
