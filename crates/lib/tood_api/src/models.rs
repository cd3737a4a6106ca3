//! API request and response bodies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tood_core::models::review::{ReviewRecord, VenueId, VenueRatingStats};

/// Error body for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

/// `POST /login` body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub credential: String,
}

/// `POST /logout` reply.
#[derive(Debug, Clone, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// `GET /health` reply.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /reviews/{venueId}` reply.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewListResponse {
    pub success: bool,
    pub reviews: Vec<ReviewRecord>,
}

/// `POST /reviews/{venueId}` reply.
#[derive(Debug, Clone, Serialize)]
pub struct CreateReviewResponse {
    pub success: bool,
    pub message: String,
    pub review: ReviewRecord,
}

/// `GET /reviews/stats` query. `buffetId` is accepted as an alias.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    #[serde(default, alias = "buffetId")]
    pub venue_id: Option<String>,
}

/// Stats for one venue, or for every reviewed venue keyed by id.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StatsPayload {
    Single(VenueRatingStats),
    All(BTreeMap<VenueId, VenueRatingStats>),
}

/// `GET /reviews/stats` reply.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: StatsPayload,
}

/// `POST /menu/register` reply.
#[derive(Debug, Clone, Serialize)]
pub struct MenuRegisterResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<Value>,
}

/// `POST /upload/image` reply.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    pub success: bool,
    pub image_url: String,
    pub message: String,
}
