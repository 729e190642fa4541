use std::collections::HashMap;

use crate::models::{ItemId, Preferences, UserProfile};
use crate::services::catalog::CatalogIndex;

/// Fields a caller may supply when creating or updating a profile
///
/// `None` leaves the stored value untouched; `Some` replaces it wholesale.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub location: Option<String>,
    pub preferences: Option<Preferences>,
    pub history: Option<Vec<ItemId>>,
}

/// Derives a profile's feature vector from its preferences and booking history
///
/// Preferences are assigned directly to their category's component; each history
/// entry then adds a recency weight in [0.5, 1.0) to its item's category, later
/// bookings weighing more. The result is L1-normalized when it carries any signal.
///
/// Negative or non-finite preference weights are ignored, and a sum that
/// overflows counts as no signal, so the vector is either all zeros or sums to 1.
pub fn compute_feature_vector(
    preferences: &Preferences,
    history: &[ItemId],
    catalog: &CatalogIndex,
) -> Vec<f64> {
    let mut vector = vec![0.0; catalog.category_count()];

    for (name, weight) in preferences.iter() {
        if !(weight.is_finite() && weight > 0.0) {
            continue;
        }
        if let Some(id) = catalog.category_id(name) {
            vector[id] = weight;
        }
    }

    let len = history.len() as f64;
    for (idx, item_id) in history.iter().enumerate() {
        let Some(item) = catalog.item(*item_id) else {
            continue;
        };
        let recency_weight = 0.5 * (1.0 + idx as f64 / len);
        vector[item.category_id] += recency_weight;
    }

    let sum: f64 = vector.iter().sum();
    if !sum.is_finite() {
        tracing::warn!("Feature vector overflowed, treating profile as empty");
        return vec![0.0; vector.len()];
    }
    if sum > 0.0 {
        for component in vector.iter_mut() {
            *component /= sum;
        }
    }

    vector
}

/// Holds one profile per user, created lazily on first reference
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profiles: HashMap<String, UserProfile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str) -> Option<&UserProfile> {
        self.profiles.get(user_id)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.profiles.contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &UserProfile)> {
        self.profiles.iter()
    }

    /// Creates the profile if absent, applies the supplied fields and recomputes
    /// the feature vector
    pub fn create_or_update_profile(
        &mut self,
        catalog: &CatalogIndex,
        user_id: &str,
        update: ProfileUpdate,
    ) -> &UserProfile {
        let profile = self.profiles.entry(user_id.to_string()).or_insert_with(|| {
            tracing::info!(user_id = %user_id, "Creating user profile");
            UserProfile::new(user_id, format!("User {}", user_id), catalog.category_count())
        });

        if let Some(name) = update.name {
            profile.name = name;
        }
        if let Some(address) = update.address {
            profile.address = Some(address);
        }
        if let Some(location) = update.location {
            profile.location = Some(location);
        }
        if let Some(preferences) = update.preferences {
            profile.preferences = preferences;
        }
        if let Some(history) = update.history {
            profile.history = history;
        }

        Self::recompute(profile, catalog);

        tracing::debug!(
            user_id = %user_id,
            preferences = profile.preferences.len(),
            history = profile.history.len(),
            "Profile updated"
        );

        profile
    }

    /// Returns the user's profile, creating an empty default one if needed
    pub fn get_or_create(&mut self, catalog: &CatalogIndex, user_id: &str) -> &UserProfile {
        if !self.profiles.contains_key(user_id) {
            tracing::info!(user_id = %user_id, "User not found, creating default profile");
            return self.create_or_update_profile(catalog, user_id, ProfileUpdate::default());
        }
        &self.profiles[user_id]
    }

    /// Flags the user as needing urgent service
    ///
    /// A known category (matched case-insensitively) gets its preference forced to
    /// 1.0. Returns `false` when the user has no profile.
    pub fn set_urgent_need(
        &mut self,
        catalog: &CatalogIndex,
        user_id: &str,
        category: Option<&str>,
    ) -> bool {
        let Some(profile) = self.profiles.get_mut(user_id) else {
            tracing::debug!(user_id = %user_id, "Urgent need ignored for unknown user");
            return false;
        };

        profile.urgent_need = true;

        if let Some(resolved) = category.and_then(|label| catalog.resolve_category(label)) {
            profile.preferences.set(resolved.name.clone(), 1.0);
            Self::recompute(profile, catalog);
        }

        tracing::info!(user_id = %user_id, category = ?category, "Urgent need set");
        true
    }

    /// Adds `delta` to the user's raw preference for `category` and recomputes.
    /// Returns `false` when the user has no profile.
    pub fn add_preference(
        &mut self,
        catalog: &CatalogIndex,
        user_id: &str,
        category: &str,
        delta: f64,
    ) -> bool {
        let Some(profile) = self.profiles.get_mut(user_id) else {
            return false;
        };

        profile.preferences.add(category, delta);
        Self::recompute(profile, catalog);
        true
    }

    /// Recomputes the derived feature vector in place
    pub fn recompute(profile: &mut UserProfile, catalog: &CatalogIndex) {
        profile.feature_vector =
            compute_feature_vector(&profile.preferences, &profile.history, catalog);
    }

    /// Replaces every stored profile; used when restoring a snapshot
    pub(crate) fn replace_all(&mut self, profiles: HashMap<String, UserProfile>) {
        self.profiles = profiles;
    }
}
