use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

use crate::models::{CatalogItem, CategoryId, ItemId, UserProfile};
use crate::services::catalog::CatalogIndex;
use crate::services::scoring::{rank, RecommendOptions};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown season: {0}")]
pub struct UnknownSeason(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Category names typically in demand during the season
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            Season::Winter => &["HVAC", "Plumbing", "Insulation"],
            Season::Spring => &["Landscaping", "Cleaning", "Painting"],
            Season::Summer => &["HVAC", "Landscaping", "Roofing"],
            Season::Fall => &["HVAC", "Landscaping", "Roofing", "Plumbing"],
        }
    }
}

impl FromStr for Season {
    type Err = UnknownSeason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" | "autumn" => Ok(Season::Fall),
            _ => Err(UnknownSeason(s.to_string())),
        }
    }
}

impl Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Season::Winter => write!(f, "winter"),
            Season::Spring => write!(f, "spring"),
            Season::Summer => write!(f, "summer"),
            Season::Fall => write!(f, "fall"),
        }
    }
}

/// Stable sort by rating, best first
fn sort_by_rating(items: &mut [&CatalogItem]) {
    items.sort_by(|a, b| b.rating.total_cmp(&a.rating));
}

/// Items offering urgent service, best candidates first
///
/// An unknown `category` is ignored rather than filtering everything out. For a
/// profile with a location token, items serving that location come first and
/// rating breaks ties; otherwise items are ordered by rating alone.
pub fn emergency_services<'a>(
    catalog: &'a CatalogIndex,
    profile: Option<&UserProfile>,
    category: Option<&str>,
    n: usize,
) -> Vec<&'a CatalogItem> {
    let category_id = category
        .and_then(|label| catalog.resolve_category(label))
        .map(|c| c.id);

    let mut urgent: Vec<&CatalogItem> = catalog
        .items()
        .iter()
        .filter(|item| item.is_urgent)
        .filter(|item| category_id.map_or(true, |id| item.category_id == id))
        .collect();

    match profile.and_then(UserProfile::location_token) {
        Some(token) => urgent.sort_by(|a, b| {
            b.serves(token)
                .cmp(&a.serves(token))
                .then_with(|| b.rating.total_cmp(&a.rating))
        }),
        None => sort_by_rating(&mut urgent),
    }

    urgent.truncate(n);
    urgent
}

/// Seasonal shortlist, personalized when a profile is given
///
/// With a profile, the user's top `n` recommendations that fall in a seasonal
/// category come first, topped up with the best-rated remaining seasonal items.
/// Without one, the best-rated seasonal items are returned.
pub fn seasonal_recommendations<'a>(
    catalog: &'a CatalogIndex,
    profile: Option<&UserProfile>,
    season: Season,
    n: usize,
) -> Vec<&'a CatalogItem> {
    let seasonal: HashSet<CategoryId> = season
        .categories()
        .iter()
        .filter_map(|name| catalog.category_id(name))
        .collect();

    if seasonal.is_empty() {
        tracing::debug!(season = %season, "No seasonal categories in catalog");
        return Vec::new();
    }

    let mut candidates: Vec<&CatalogItem> = catalog
        .items()
        .iter()
        .filter(|item| seasonal.contains(&item.category_id))
        .collect();
    sort_by_rating(&mut candidates);

    let Some(profile) = profile else {
        candidates.truncate(n);
        return candidates;
    };

    let options = RecommendOptions {
        n,
        location_based: true,
        ..Default::default()
    };
    let mut picks: Vec<&CatalogItem> = rank(profile, catalog, &options)
        .into_iter()
        .map(|scored| scored.item)
        .filter(|item| seasonal.contains(&item.category_id))
        .collect();

    let picked: HashSet<ItemId> = picks.iter().map(|item| item.id).collect();
    let missing = n.saturating_sub(picks.len());
    picks.extend(
        candidates
            .into_iter()
            .filter(|item| !picked.contains(&item.id))
            .take(missing),
    );

    picks
}
