//! Remote access layer: the REST client and the request/response protocol
//! that connects it to the controller.
//!
//! # Architecture
//!
//! - `messages`: Request/response types with trace context propagation
//! - `envelope`: The canonical response envelope and payload validation
//! - `client`: The [`UserApi`] seam and its `reqwest` implementation
//! - `dispatcher`: Turns requests into responses on a spawned task

pub mod client;
pub mod dispatcher;
pub mod envelope;
pub mod messages;

pub use client::{ApiResult, HttpUserApi, UserApi, LOGIN_FAILURE_MESSAGE};
pub use dispatcher::RemoteDispatcher;
pub use messages::{RemoteRequest, RemoteResponse, TraceContext};
