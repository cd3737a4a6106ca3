//! Review submission validation.
//!
//! A [`ReviewSubmission`] is the raw client payload; [`NewReview`] is the
//! only input [`super::ReviewStore::append`] accepts and can only be built
//! from valid data.

use serde::Deserialize;
use serde_json::Value;

use super::ReviewError;
use crate::models::auth::IdentityClaims;
use crate::models::review::{Rating, VenueId};

/// Raw review payload as posted by a client. Every field is optional so
/// that missing or mistyped fields surface as [`ReviewError::InvalidReview`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    #[serde(default)]
    pub buffet_id: Option<Value>,
    #[serde(default)]
    pub taste_rating: Option<Value>,
    #[serde(default)]
    pub price_rating: Option<Value>,
    #[serde(default)]
    pub service_rating: Option<Value>,
    #[serde(default)]
    pub comment: Option<Value>,
}

impl ReviewSubmission {
    /// Validate this submission for `venue_id`, authored by `author`.
    ///
    /// `buffetId` in the body is optional; when present it must name the
    /// same venue as `venue_id`.
    pub fn validate(
        &self,
        venue_id: VenueId,
        author: &IdentityClaims,
    ) -> Result<NewReview, ReviewError> {
        if let Some(body_venue) = self.buffet_id.as_ref().filter(|v| !v.is_null()) {
            match parse_venue_id(body_venue) {
                Some(id) if id == venue_id => {}
                Some(_) => return Err(invalid("buffetId does not match the venue in the path")),
                None => return Err(invalid("buffetId must be a venue id")),
            }
        }

        let taste = parse_rating("tasteRating", self.taste_rating.as_ref())?;
        let price = parse_rating("priceRating", self.price_rating.as_ref())?;
        let service = parse_rating("serviceRating", self.service_rating.as_ref())?;
        let comment = match &self.comment {
            Some(Value::String(s)) => s.as_str(),
            Some(_) => return Err(invalid("comment must be text")),
            None => "",
        };

        NewReview::new(venue_id, author, taste, price, service, comment)
    }
}

/// A validated review awaiting an id and timestamp from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    venue_id: VenueId,
    author_name: String,
    author_picture_url: Option<String>,
    taste_rating: Rating,
    price_rating: Rating,
    service_rating: Rating,
    comment: String,
}

impl NewReview {
    /// Build a review, snapshotting the author's current name and picture.
    /// The comment is trimmed and must not be empty.
    pub fn new(
        venue_id: VenueId,
        author: &IdentityClaims,
        taste_rating: Rating,
        price_rating: Rating,
        service_rating: Rating,
        comment: &str,
    ) -> Result<Self, ReviewError> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(invalid("comment must not be empty"));
        }
        Ok(Self {
            venue_id,
            author_name: author.author_name(),
            author_picture_url: author.picture_url.clone(),
            taste_rating,
            price_rating,
            service_rating,
            comment: comment.to_string(),
        })
    }

    pub fn venue_id(&self) -> VenueId {
        self.venue_id
    }

    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    pub fn author_picture_url(&self) -> Option<&str> {
        self.author_picture_url.as_deref()
    }

    pub fn taste_rating(&self) -> Rating {
        self.taste_rating
    }

    pub fn price_rating(&self) -> Rating {
        self.price_rating
    }

    pub fn service_rating(&self) -> Rating {
        self.service_rating
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }
}

fn invalid(msg: &str) -> ReviewError {
    ReviewError::InvalidReview(msg.to_string())
}

fn parse_rating(field: &str, value: Option<&Value>) -> Result<Rating, ReviewError> {
    let value = value
        .filter(|v| !v.is_null())
        .ok_or_else(|| ReviewError::InvalidReview(format!("{field} is required")))?;
    value
        .as_i64()
        .and_then(Rating::new)
        .ok_or_else(|| {
            ReviewError::InvalidReview(format!(
                "{field} must be an integer between {} and {}",
                Rating::MIN,
                Rating::MAX
            ))
        })
}

/// Venue ids arrive as numbers or numeric strings.
pub fn parse_venue_id(value: &Value) -> Option<VenueId> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
