//! Per-venue rating aggregation.
//!
//! Stats are recomputed from the store's contents on every query; nothing is
//! cached or updated incrementally. Means are computed with exact integer
//! arithmetic and rounded once, at the end, to one decimal place with
//! round-half-away-from-zero.

use std::collections::BTreeMap;

use super::{ReviewError, ReviewStore};
use crate::models::review::{ReviewRecord, VenueId, VenueRatingStats};

/// Stats for one venue. A venue with no reviews yields all-zero stats.
pub async fn compute_stats(
    store: &dyn ReviewStore,
    venue_id: VenueId,
) -> Result<VenueRatingStats, ReviewError> {
    let reviews = store.list_by_venue(venue_id).await?;
    Ok(venue_stats(venue_id, &reviews))
}

/// Stats for every venue that has at least one review.
pub async fn compute_all_stats(
    store: &dyn ReviewStore,
) -> Result<BTreeMap<VenueId, VenueRatingStats>, ReviewError> {
    let reviews = store.list_all().await?;
    Ok(all_venue_stats(&reviews))
}

/// Aggregate the reviews of `venue_id` found in `reviews`.
pub fn venue_stats(venue_id: VenueId, reviews: &[ReviewRecord]) -> VenueRatingStats {
    let mut totals = Totals::default();
    for review in reviews.iter().filter(|r| r.venue_id == venue_id) {
        totals.add(review);
    }
    totals.into_stats(venue_id)
}

/// Partition `reviews` by venue and aggregate each partition.
pub fn all_venue_stats(reviews: &[ReviewRecord]) -> BTreeMap<VenueId, VenueRatingStats> {
    let mut totals: BTreeMap<VenueId, Totals> = BTreeMap::new();
    for review in reviews {
        totals.entry(review.venue_id).or_default().add(review);
    }
    totals
        .into_iter()
        .map(|(venue_id, t)| (venue_id, t.into_stats(venue_id)))
        .collect()
}

#[derive(Debug, Default)]
struct Totals {
    count: u64,
    taste: u64,
    price: u64,
    service: u64,
}

impl Totals {
    fn add(&mut self, review: &ReviewRecord) {
        self.count += 1;
        self.taste += u64::from(review.taste_rating.get());
        self.price += u64::from(review.price_rating.get());
        self.service += u64::from(review.service_rating.get());
    }

    fn into_stats(self, venue_id: VenueId) -> VenueRatingStats {
        if self.count == 0 {
            return VenueRatingStats::empty(venue_id);
        }
        // The overall rating is the mean of the three category means, which
        // equals (taste + price + service) / (3 * count) before rounding.
        VenueRatingStats {
            venue_id,
            review_count: self.count,
            taste_rating: round_tenths(self.taste, self.count),
            price_rating: round_tenths(self.price, self.count),
            service_rating: round_tenths(self.service, self.count),
            overall_rating: round_tenths(self.taste + self.price + self.service, 3 * self.count),
        }
    }
}

/// `numerator / denominator` rounded to one decimal, half away from zero.
///
/// `denominator` must be non-zero.
fn round_tenths(numerator: u64, denominator: u64) -> f64 {
    let tenths = (20 * numerator + denominator) / (2 * denominator);
    tenths as f64 / 10.0
}
