use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ItemId;

/// Raw per-category interest weights, keyed by category name
///
/// Weights are unbounded and accumulate upward as interactions are tracked.
/// Missing categories read as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Preferences(BTreeMap<String, f64>);

impl Preferences {
    /// Creates an empty preference table
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored weight for a category, or zero when absent
    pub fn weight(&self, category: &str) -> f64 {
        self.0.get(category).copied().unwrap_or(0.0)
    }

    /// Whether a weight has been stored for the category
    pub fn contains(&self, category: &str) -> bool {
        self.0.contains_key(category)
    }

    /// Overwrites the weight for a category
    pub fn set(&mut self, category: impl Into<String>, weight: f64) {
        self.0.insert(category.into(), weight);
    }

    /// Adds `delta` to the category's weight, starting from zero
    pub fn add(&mut self, category: impl Into<String>, delta: f64) {
        *self.0.entry(category.into()).or_insert(0.0) += delta;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, weight)| (name.as_str(), *weight))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, f64)> for Preferences {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A user's inferred interests and booking state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    /// Location token matched against item service areas (e.g. a ZIP code)
    #[serde(default, alias = "zip_code")]
    pub location: Option<String>,
    pub preferences: Preferences,
    /// Booked item ids, oldest first
    pub history: Vec<ItemId>,
    /// One component per category; derived from preferences and history
    pub feature_vector: Vec<f64>,
    pub urgent_need: bool,
}

impl UserProfile {
    /// Creates an empty profile with a zero feature vector of the given length
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, category_count: usize) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            address: None,
            location: None,
            preferences: Preferences::new(),
            history: Vec::new(),
            feature_vector: vec![0.0; category_count],
            urgent_need: false,
        }
    }

    /// Non-empty location token, if the profile has one
    pub fn location_token(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    pub fn has_booked(&self, item_id: ItemId) -> bool {
        self.history.contains(&item_id)
    }
}
