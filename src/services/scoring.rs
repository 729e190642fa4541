use serde::Serialize;

use crate::models::{CatalogItem, CategoryId, ItemId, UserProfile};
use crate::services::catalog::CatalogIndex;

/// Score multiplier for items whose service area mentions the user's location
pub const LOCATION_BOOST: f64 = 1.5;

/// Knobs for a single recommendation request
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendOptions {
    /// Maximum number of results
    pub n: usize,
    /// Keep items the user has already booked
    pub include_history: bool,
    /// How strongly expensive items are penalized, in [0, 1]
    pub price_sensitivity: f64,
    /// Boost items serving the user's location
    pub location_based: bool,
    /// Only consider items offering urgent service
    pub urgent_only: bool,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            n: 5,
            include_history: false,
            price_sensitivity: 0.5,
            location_based: true,
            urgent_only: false,
        }
    }
}

/// A catalog item paired with its final score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem<'a> {
    pub item: &'a CatalogItem,
    pub score: f64,
}

/// A ranked, explained recommendation as returned to callers
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub id: ItemId,
    pub description: String,
    pub price: f64,
    pub rating: f64,
    pub category_id: CategoryId,
    pub provider: String,
    pub is_urgent: bool,
    pub service_area: String,
    pub recommendation_score: f64,
    pub explanation: String,
}

impl Recommendation {
    pub fn new(scored: &ScoredItem<'_>, explanation: String) -> Self {
        let item = scored.item;
        Self {
            id: item.id,
            description: item.description.clone(),
            price: item.price,
            rating: item.rating,
            category_id: item.category_id,
            provider: item.provider.clone(),
            is_urgent: item.is_urgent,
            service_area: item.service_area.clone(),
            recommendation_score: scored.score,
            explanation,
        }
    }
}

/// Cosine similarity: dot product over the product of L2 norms
///
/// Returns 0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// One-hot encoding of a category over `len` categories
pub fn one_hot(category_id: CategoryId, len: usize) -> Vec<f64> {
    let mut vector = vec![0.0; len];
    if let Some(slot) = vector.get_mut(category_id) {
        *slot = 1.0;
    }
    vector
}

/// Scores every candidate item for a profile and returns the top `options.n`
///
/// score = cosine(profile, one_hot(category))
///       × (1 − normalized_price × price_sensitivity)   (skipped at sensitivity 0)
///       × rating / 5
///       × LOCATION_BOOST if the service area mentions the user's location
///
/// Booked items are dropped unless `include_history` is set. Ties keep catalog
/// order.
pub fn rank<'a>(
    profile: &UserProfile,
    catalog: &'a CatalogIndex,
    options: &RecommendOptions,
) -> Vec<ScoredItem<'a>> {
    if options.n == 0 {
        return Vec::new();
    }

    let price_sensitivity = options.price_sensitivity.clamp(0.0, 1.0);
    let location = if options.location_based {
        profile.location_token()
    } else {
        None
    };
    let category_count = catalog.category_count();

    let mut scored: Vec<ScoredItem<'a>> = catalog
        .items()
        .iter()
        .filter(|item| !options.urgent_only || item.is_urgent)
        .map(|item| {
            let encoded = one_hot(item.category_id, category_count);
            let mut score = cosine_similarity(&profile.feature_vector, &encoded);

            if price_sensitivity > 0.0 {
                score *= 1.0 - item.normalized_price * price_sensitivity;
            }

            score *= item.rating / 5.0;

            if let Some(token) = location {
                if item.serves(token) {
                    score *= LOCATION_BOOST;
                }
            }

            ScoredItem { item, score }
        })
        .filter(|scored| options.include_history || !profile.has_booked(scored.item.id))
        .collect();

    // sort_by is stable, so equal scores keep catalog order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(options.n);

    tracing::debug!(
        user_id = %profile.user_id,
        returned = scored.len(),
        "Candidates ranked"
    );

    scored
}
