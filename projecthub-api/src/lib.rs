//! # ProjectHub API Server Library
//!
//! HTTP layer of ProjectHub: configuration, the axum router and its
//! handlers, and the mapping of domain errors to responses.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from the environment
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Validating JSON extractor
//! - `middleware`: Response security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
