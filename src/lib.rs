/// Basic application code
pub mod app;
/// Application authentication and authorization
pub mod auth;
/// REST client for the exit interview API
pub mod client;
/// Controllers for REST endpoints
pub mod controller;
/// Cryptography-related objects
pub mod crypto;
/// Domain objects
pub mod domain;
/// Error enums
pub mod error;
/// Persistence
pub mod store;
/// Application settings
pub mod settings;
/// Application telemetry for tracing and logging
pub mod telemetry;
