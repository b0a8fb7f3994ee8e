// Content core
pub mod elemental;

// Shared infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Application layer
pub mod api;
pub mod server;
