//! Storage layer for the Pheme feedback service
//!
//! Provides the append-only persistence abstraction and its SQLite
//! implementation. Records are inserted exactly once and never mutated;
//! aggregate statistics are computed by the database in a single query.

pub mod sqlite;

use crate::error::Result;
use crate::types::{FeedbackRecord, FeedbackStats, NewFeedback};
use async_trait::async_trait;

/// Storage backend trait defining all required operations
///
/// Implementations must guarantee that an insert is atomic: a concurrent
/// `list_all` never observes a partially written record.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Persist a validated submission, assigning its id and timestamp
    ///
    /// Returns the complete stored record including the assigned fields.
    async fn insert(&self, feedback: &NewFeedback) -> Result<FeedbackRecord>;

    /// Return all records ordered newest-first
    ///
    /// Produces a finite, materialized snapshot, not a live cursor.
    async fn list_all(&self) -> Result<Vec<FeedbackRecord>>;

    /// Compute aggregate statistics as of a single consistent snapshot
    async fn stats(&self) -> Result<FeedbackStats>;
}
