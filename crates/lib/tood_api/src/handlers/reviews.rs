//! Review listing, submission and rating statistics.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use tood_core::models::review::VenueId;
use tood_core::reviews::ReviewSubmission;
use tood_core::reviews::stats::{compute_all_stats, compute_stats};
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    CreateReviewResponse, ReviewListResponse, StatsPayload, StatsQuery, StatsResponse,
};

fn venue_id(path: Result<Path<VenueId>, PathRejection>) -> AppResult<VenueId> {
    path.ok()
        .map(|Path(id)| id)
        .filter(|id| *id >= 1)
        .ok_or_else(|| AppError::InvalidReview("venue id must be a positive integer".into()))
}

/// `GET /reviews/{venueId}`: all reviews of a venue, in submission order.
pub async fn list_reviews_handler(
    State(state): State<AppState>,
    path: Result<Path<VenueId>, PathRejection>,
) -> AppResult<Json<ReviewListResponse>> {
    let venue_id = venue_id(path)?;
    let reviews = state.reviews.list_by_venue(venue_id).await?;
    Ok(Json(ReviewListResponse {
        success: true,
        reviews,
    }))
}

/// `POST /reviews/{venueId}`: submit a review as the session holder.
///
/// The body is validated in full before the store is touched.
pub async fn create_review_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    path: Result<Path<VenueId>, PathRejection>,
    body: Result<Json<ReviewSubmission>, JsonRejection>,
) -> AppResult<Json<CreateReviewResponse>> {
    let venue_id = venue_id(path)?;
    let Json(submission) =
        body.map_err(|e| AppError::InvalidReview(format!("malformed review body: {e}")))?;

    let review = submission.validate(venue_id, &user.0)?;
    let record = state.reviews.append(review).await?;

    info!(id = record.id, venue_id, sub = %user.0.subject, "review created");
    Ok(Json(CreateReviewResponse {
        success: true,
        message: "Review submitted".into(),
        review: record,
    }))
}

/// `GET /reviews/stats?venueId=`: stats for one venue, or for every venue
/// with at least one review when no id is given.
pub async fn review_stats_handler(
    State(state): State<AppState>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> AppResult<Json<StatsResponse>> {
    let Query(query) =
        query.map_err(|_| AppError::InvalidReview("malformed stats query".into()))?;
    let requested = query
        .venue_id
        .filter(|v| !v.trim().is_empty());

    let stats = match requested {
        Some(raw) => {
            let venue_id = raw
                .trim()
                .parse::<VenueId>()
                .ok()
                .filter(|id| *id >= 1)
                .ok_or_else(|| {
                    AppError::InvalidReview("venueId must be a positive integer".into())
                })?;
            StatsPayload::Single(compute_stats(state.reviews.as_ref(), venue_id).await?)
        }
        None => StatsPayload::All(compute_all_stats(state.reviews.as_ref()).await?),
    };

    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}
