//! Review domain models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a venue (a buffet location).
pub type VenueId = i64;

/// A single category rating, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Returns `None` when `value` is outside `1..=5`.
    pub fn new(value: i64) -> Option<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rating::new(value).ok_or_else(|| {
            format!(
                "rating must be between {} and {}, got {value}",
                Rating::MIN,
                Rating::MAX
            )
        })
    }
}

impl From<Rating> for u8 {
    fn from(r: Rating) -> Self {
        r.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored review. Immutable once created.
///
/// `author_name` and `author_picture_url` are a snapshot of the author's
/// identity at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: i64,
    pub venue_id: VenueId,
    pub author_name: String,
    pub author_picture_url: Option<String>,
    pub taste_rating: Rating,
    pub price_rating: Rating,
    pub service_rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Per-venue rating statistics, derived from the stored reviews on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueRatingStats {
    pub venue_id: VenueId,
    pub review_count: u64,
    pub taste_rating: f64,
    pub price_rating: f64,
    pub service_rating: f64,
    pub overall_rating: f64,
}

impl VenueRatingStats {
    /// Stats for a venue with no reviews: every field is exactly zero.
    pub fn empty(venue_id: VenueId) -> Self {
        Self {
            venue_id,
            review_count: 0,
            taste_rating: 0.0,
            price_rating: 0.0,
            service_rating: 0.0,
            overall_rating: 0.0,
        }
    }
}
