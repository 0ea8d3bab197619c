//! HTTP API for feedback submission and aggregate statistics
//!
//! Provides:
//! - Feedback submission with validation
//! - Record listing, newest first
//! - Aggregate statistics for the dashboard
//! - Health check

pub mod server;

pub use server::{build_router, ApiServer, AppState};
