//! LuminaWeb screenshot service
//!
//! Captures website screenshots through a third-party API and hands clients
//! signed, expiring proxy URLs instead of the upstream API key.
//! This library exposes modules for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
