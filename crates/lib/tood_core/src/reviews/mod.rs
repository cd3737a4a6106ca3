//! Reviews: submission validation, the append-only review store, and
//! per-venue rating aggregation.

pub mod memory;
pub mod postgres;
pub mod stats;
pub mod validation;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::review::{ReviewRecord, VenueId};
pub use validation::{NewReview, ReviewSubmission};

/// Review errors.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Invalid review: {0}")]
    InvalidReview(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Append-only collection of reviews keyed by venue.
///
/// Implementations must be safe under concurrent `append`: ids are unique
/// and non-decreasing in insertion order, and readers observe each record
/// either completely or not at all.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Store a validated review, assigning its id and creation timestamp.
    async fn append(&self, review: NewReview) -> Result<ReviewRecord, ReviewError>;

    /// All reviews for `venue_id`, in insertion order.
    async fn list_by_venue(&self, venue_id: VenueId) -> Result<Vec<ReviewRecord>, ReviewError>;

    /// Every stored review, in insertion order, as one consistent snapshot.
    async fn list_all(&self) -> Result<Vec<ReviewRecord>, ReviewError>;
}
