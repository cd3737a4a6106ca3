//! In-memory review store.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{NewReview, ReviewError, ReviewStore};
use crate::models::review::{ReviewRecord, VenueId};

#[derive(Debug, Default)]
struct Inner {
    records: Vec<ReviewRecord>,
    last_id: i64,
}

/// Review store backed by an insertion-ordered `Vec` behind a lock.
///
/// Id assignment and insertion happen under one write lock, so concurrent
/// appends never share an id and readers never see a partial record.
#[derive(Debug, Default)]
pub struct InMemoryReviewStore {
    inner: RwLock<Inner>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored reviews.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn append(&self, review: NewReview) -> Result<ReviewRecord, ReviewError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let record = ReviewRecord {
            id: inner.last_id,
            venue_id: review.venue_id(),
            author_name: review.author_name().to_string(),
            author_picture_url: review.author_picture_url().map(String::from),
            taste_rating: review.taste_rating(),
            price_rating: review.price_rating(),
            service_rating: review.service_rating(),
            comment: review.comment().to_string(),
            created_at: Utc::now(),
        };
        inner.records.push(record.clone());
        debug!(id = record.id, venue_id = record.venue_id, "review appended");
        Ok(record)
    }

    async fn list_by_venue(&self, venue_id: VenueId) -> Result<Vec<ReviewRecord>, ReviewError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .iter()
            .filter(|r| r.venue_id == venue_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<ReviewRecord>, ReviewError> {
        Ok(self.inner.read().await.records.clone())
    }
}
