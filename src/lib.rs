//! Pheme - Feedback Collection Service
//!
//! A small Rust service that collects user feedback and serves aggregate
//! statistics for a dashboard:
//! - Validated submissions (name, email, message, rating 1-5)
//! - Append-only SQLite persistence behind a pooled storage handle
//! - Aggregate statistics computed in a single SQL query
//! - JSON API consumed by the bundled terminal dashboard
//!
//! # Architecture
//!
//! The system is organized into several layers:
//! - **Types**: Core data structures (FeedbackRecord, FeedbackStats)
//! - **Validate**: Pure submission validation over untrusted JSON
//! - **Storage**: Append-only SQLite backend behind the FeedbackStore trait
//! - **API**: Stateless axum handlers over an injected storage handle
//!
//! # Example
//!
//! ```ignore
//! use pheme_core::{ApiServer, ServerConfig, SqliteStorage};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = SqliteStorage::open("pheme.db")?;
//!     storage.init_schema().await?;
//!
//!     let server = ApiServer::new(ServerConfig::default(), Arc::new(storage));
//!     server.serve().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod storage;
pub mod types;
pub mod validate;

// Re-export commonly used types
pub use api::{ApiServer, AppState};
pub use config::ServerConfig;
pub use error::{PhemeError, Result};
pub use storage::{sqlite::SqliteStorage, FeedbackStore};
pub use types::{FeedbackId, FeedbackRecord, FeedbackStats, NewFeedback};
pub use validate::{validate_submission, ValidationError};
