//! # ProjectHub Shared Library
//!
//! Domain types and persistence used by the ProjectHub API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD queries
//! - `services`: Thin operation layer over the models used by the HTTP handlers
//! - `auth`: Password hashing, JWT tokens, auth context and project permissions
//! - `db`: Connection pool and migrations
//! - `storage`: Blob storage for uploaded files

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod storage;

/// Current version of the ProjectHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
