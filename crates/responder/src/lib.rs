//! HTTP client for the remote response-generation service.
//!
//! The service exposes `POST /chat` (message in, reply text out) and
//! `GET /health`. Calls carry a fixed timeout and are never retried: a
//! failure surfaces to the gateway's single catch point, which substitutes
//! the apology reply.

pub mod client;
pub mod error;

pub use {
    client::{ChatRequest, ChatResponse, DEFAULT_TIMEOUT, ResponderClient},
    error::{Error, Result},
};
