//! PostgreSQL review store.
//!
//! Ids come from a `BIGSERIAL`, so they are unique under concurrent inserts
//! and ordering by id preserves insertion order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{NewReview, ReviewError, ReviewStore};
use crate::models::review::{Rating, ReviewRecord, VenueId};

type ReviewRow = (
    i64,
    i64,
    String,
    Option<String>,
    i16,
    i16,
    i16,
    String,
    DateTime<Utc>,
);

const SELECT_COLUMNS: &str = "SELECT id, venue_id, author_name, author_picture_url, \
     taste_rating, price_rating, service_rating, comment, created_at FROM reviews";

/// Review store backed by the `reviews` table.
#[derive(Clone)]
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn append(&self, review: NewReview) -> Result<ReviewRecord, ReviewError> {
        let (id, created_at) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            "INSERT INTO reviews \
             (venue_id, author_name, author_picture_url, taste_rating, price_rating, service_rating, comment) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, created_at",
        )
        .bind(review.venue_id())
        .bind(review.author_name())
        .bind(review.author_picture_url())
        .bind(i16::from(review.taste_rating().get()))
        .bind(i16::from(review.price_rating().get()))
        .bind(i16::from(review.service_rating().get()))
        .bind(review.comment())
        .fetch_one(&self.pool)
        .await?;

        Ok(ReviewRecord {
            id,
            venue_id: review.venue_id(),
            author_name: review.author_name().to_string(),
            author_picture_url: review.author_picture_url().map(String::from),
            taste_rating: review.taste_rating(),
            price_rating: review.price_rating(),
            service_rating: review.service_rating(),
            comment: review.comment().to_string(),
            created_at,
        })
    }

    async fn list_by_venue(&self, venue_id: VenueId) -> Result<Vec<ReviewRecord>, ReviewError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "{SELECT_COLUMNS} WHERE venue_id = $1 ORDER BY id"
        ))
        .bind(venue_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(record_from_row).collect()
    }

    async fn list_all(&self) -> Result<Vec<ReviewRecord>, ReviewError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!("{SELECT_COLUMNS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(record_from_row).collect()
    }
}

fn record_from_row(row: ReviewRow) -> Result<ReviewRecord, ReviewError> {
    let (id, venue_id, author_name, author_picture_url, taste, price, service, comment, created_at) =
        row;
    Ok(ReviewRecord {
        id,
        venue_id,
        author_name,
        author_picture_url,
        taste_rating: stored_rating(id, taste)?,
        price_rating: stored_rating(id, price)?,
        service_rating: stored_rating(id, service)?,
        comment,
        created_at,
    })
}

fn stored_rating(id: i64, value: i16) -> Result<Rating, ReviewError> {
    Rating::new(i64::from(value))
        .ok_or_else(|| ReviewError::Internal(format!("review {id} has out-of-range rating {value}")))
}
