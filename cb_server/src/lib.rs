//! HTTP server for the contacts API.
//!
//! Exposes the authentication core of `contact_book` over axum, together with
//! configuration loading, structured logging and Prometheus metrics.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
