#![deny(missing_docs)]

//! Core library for the Rusty Videos catalog server.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Video records, validation rules, and storage.
pub mod videos;
