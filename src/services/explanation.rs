use crate::models::{ItemId, UserProfile};
use crate::services::catalog::CatalogIndex;

pub const PROFILE_NOT_FOUND: &str = "User profile not found.";
pub const ITEM_NOT_FOUND: &str = "Service not found.";
pub const GENERIC_MATCH: &str = "This matches your overall preferences.";

/// Minimum raw preference weight that counts as a stated interest
const INTEREST_THRESHOLD: f64 = 0.3;
const EXCELLENT_RATING: f64 = 4.5;
const HIGH_RATING: f64 = 4.0;
/// Items cheaper than this fraction of the mean catalog price count as affordable
const AFFORDABLE_RATIO: f64 = 0.8;

/// Builds a human-readable rationale for showing `item_id` to the profile's owner
///
/// Every applicable clause is included, in a fixed order: category interest,
/// urgent service, service area, booking history, rating tier, price.
pub fn explain(catalog: &CatalogIndex, profile: Option<&UserProfile>, item_id: ItemId) -> String {
    let Some(profile) = profile else {
        return PROFILE_NOT_FOUND.to_string();
    };
    let Some(item) = catalog.item(item_id) else {
        return ITEM_NOT_FOUND.to_string();
    };

    let mut clauses: Vec<String> = Vec::new();

    let category = catalog.category_name(item.category_id);
    if let Some(category) = category {
        if profile.preferences.weight(category) > INTEREST_THRESHOLD {
            clauses.push(format!(
                "This matches your interest in {} services.",
                category
            ));
        }
    }

    if profile.urgent_need && item.is_urgent {
        clauses.push("This provider offers same-day emergency service.".to_string());
    }

    if profile.location_token().is_some_and(|token| item.serves(token)) {
        clauses.push("This provider serves your area.".to_string());
    }

    if profile.has_booked(item.id) {
        clauses.push("You've used this service before.".to_string());
    } else {
        let booked_similar = profile.history.iter().any(|&booked| {
            catalog
                .item(booked)
                .is_some_and(|past| past.category_id == item.category_id)
        });
        if booked_similar {
            clauses.push("This is similar to services you've booked before.".to_string());
        }
    }

    if item.rating >= EXCELLENT_RATING {
        clauses.push(format!(
            "This service has an excellent rating of {} stars.",
            item.rating
        ));
    } else if item.rating >= HIGH_RATING {
        clauses.push(format!(
            "This service is highly rated with {} stars.",
            item.rating
        ));
    }

    if item.price < catalog.mean_price() * AFFORDABLE_RATIO {
        clauses.push("This is more affordable than similar services.".to_string());
    }

    if clauses.is_empty() {
        return GENERIC_MATCH.to_string();
    }

    clauses.join(" ")
}
