//! Core data types for the Pheme feedback service
//!
//! This module defines the structures shared by the storage layer, the API
//! layer, and the dashboard client: feedback records, normalized
//! submissions, and the derived statistics aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for feedback records
///
/// Wraps the SQLite rowid to provide type safety and prevent mixing
/// feedback ids with other integer values in the system. Ids are assigned
/// by storage on insert and increase monotonically in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackId(pub i64);

impl std::fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One persisted feedback submission
///
/// Records are append-only: created exactly once per successful
/// submission and never mutated afterwards. Wire casing is camelCase to
/// match the dashboard client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    /// Storage-assigned identifier, immutable after insert
    pub id: FeedbackId,

    /// Submitter name, trimmed, non-empty
    pub name: String,

    /// Submitter email, trimmed, syntactically valid
    pub email: String,

    /// Feedback message, trimmed, non-empty
    pub message: String,

    /// Rating in the inclusive range [1, 5]
    pub rating: i64,

    /// Storage-assigned creation timestamp, immutable after insert
    pub created_at: DateTime<Utc>,
}

/// A validated, normalized submission ready for insertion
///
/// Produced only by the validator: text fields are trimmed and non-empty,
/// the email matches the accepted pattern, and the rating is in [1, 5].
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub name: String,
    pub email: String,
    pub message: String,
    pub rating: i64,
}

/// Aggregate statistics over all feedback records
///
/// Computed as of a single consistent snapshot by one SQL query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackStats {
    /// Count of all records
    pub total: i64,

    /// Mean rating rounded to 2 decimal places, 0 when there are no records
    pub avg_rating: f64,

    /// Count of records with rating >= 4
    pub positive: i64,

    /// Count of records with rating < 3
    pub negative: i64,
}

impl FeedbackStats {
    /// Stats for an empty record set
    pub fn empty() -> Self {
        Self {
            total: 0,
            avg_rating: 0.0,
            positive: 0,
            negative: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_wire_shape_is_camel_case() {
        let record = FeedbackRecord {
            id: FeedbackId(7),
            name: "Alice".to_string(),
            email: "a@example.com".to_string(),
            message: "Great!".to_string(),
            rating: 5,
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], 7);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_stats_wire_shape() {
        let stats = FeedbackStats {
            total: 2,
            avg_rating: 3.5,
            positive: 1,
            negative: 1,
        };

        let value = serde_json::to_value(stats).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["avgRating"], 3.5);
        assert_eq!(value["positive"], 1);
        assert_eq!(value["negative"], 1);
    }

    #[test]
    fn test_empty_stats() {
        let stats = FeedbackStats::empty();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.avg_rating, 0.0);
    }
}
