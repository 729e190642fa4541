use std::path::Path;
use std::sync::Arc;

use crate::models::{CatalogItem, InteractionType, ItemId, UserProfile};
use crate::services::catalog::CatalogIndex;
use crate::services::discovery::{self, Season};
use crate::services::explanation;
use crate::services::interactions::InteractionTracker;
use crate::services::profiles::{ProfileStore, ProfileUpdate};
use crate::services::scoring::{self, RecommendOptions, Recommendation};
use crate::services::snapshot::{Snapshot, SnapshotError};

/// Summary of a restored snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreSummary {
    pub profiles: usize,
    pub users_with_interactions: usize,
}

/// Recommendation engine owning all mutable state for one catalog
///
/// Reads take `&self`; anything that can create or change a profile takes
/// `&mut self`, so callers sharing an engine must serialize writers.
#[derive(Debug, Clone)]
pub struct RecommenderEngine {
    catalog: Arc<CatalogIndex>,
    profiles: ProfileStore,
    interactions: InteractionTracker,
}

impl RecommenderEngine {
    pub fn new(catalog: Arc<CatalogIndex>) -> Self {
        Self {
            catalog,
            profiles: ProfileStore::new(),
            interactions: InteractionTracker::new(),
        }
    }

    pub fn catalog(&self) -> &Arc<CatalogIndex> {
        &self.catalog
    }

    pub fn profile(&self, user_id: &str) -> Option<&UserProfile> {
        self.profiles.get(user_id)
    }

    pub fn create_or_update_profile(&mut self, user_id: &str, update: ProfileUpdate) -> &UserProfile {
        self.profiles
            .create_or_update_profile(&self.catalog, user_id, update)
    }

    /// See [`ProfileStore::set_urgent_need`]
    pub fn set_urgent_need(&mut self, user_id: &str, category: Option<&str>) -> bool {
        self.profiles
            .set_urgent_need(&self.catalog, user_id, category)
    }

    /// Records an interaction; returns whether the user's preferences changed
    pub fn track(
        &mut self,
        user_id: &str,
        item_id: ItemId,
        interaction_type: &str,
        value: f64,
    ) -> bool {
        let kind = InteractionType::parse(interaction_type);
        self.interactions
            .track(&mut self.profiles, &self.catalog, user_id, item_id, &kind, value)
    }

    /// Ranked, explained recommendations; unknown users get a default profile
    pub fn recommend(&mut self, user_id: &str, options: &RecommendOptions) -> Vec<Recommendation> {
        let profile = self.profiles.get_or_create(&self.catalog, user_id);
        let ranked = scoring::rank(profile, &self.catalog, options);

        let recommendations: Vec<Recommendation> = ranked
            .iter()
            .map(|scored| {
                let explanation =
                    explanation::explain(&self.catalog, Some(profile), scored.item.id);
                Recommendation::new(scored, explanation)
            })
            .collect();

        tracing::info!(
            user_id = %user_id,
            requested = options.n,
            returned = recommendations.len(),
            "Recommendations generated"
        );

        recommendations
    }

    pub fn explain(&self, user_id: &str, item_id: ItemId) -> String {
        explanation::explain(&self.catalog, self.profiles.get(user_id), item_id)
    }

    pub fn emergency_services(
        &self,
        user_id: Option<&str>,
        category: Option<&str>,
        n: usize,
    ) -> Vec<&CatalogItem> {
        let profile = user_id.and_then(|id| self.profiles.get(id));
        discovery::emergency_services(&self.catalog, profile, category, n)
    }

    pub fn seasonal_recommendations(
        &self,
        season: Season,
        user_id: Option<&str>,
        n: usize,
    ) -> Vec<&CatalogItem> {
        let profile = user_id.and_then(|id| self.profiles.get(id));
        discovery::seasonal_recommendations(&self.catalog, profile, season, n)
    }

    /// Captures the current state in snapshot form
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            category_mapping: self.catalog.category_mapping(),
            user_profiles: self
                .profiles
                .iter()
                .map(|(id, profile)| (id.clone(), profile.clone()))
                .collect(),
            user_interactions: self.interactions.table().clone(),
        }
    }

    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        self.snapshot().save(path)
    }

    /// Replaces profiles and interactions with the snapshot's content
    ///
    /// The whole file is read and validated before anything is swapped in; on any
    /// error the current state is left untouched. Stored feature vectors are
    /// recomputed from preferences and history rather than trusted.
    pub fn restore_snapshot(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<RestoreSummary, SnapshotError> {
        let path = path.as_ref();
        let snapshot = Snapshot::load(path).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Failed to load snapshot");
            e
        })?;
        snapshot.validate(&self.catalog.category_mapping())?;

        let summary = RestoreSummary {
            profiles: snapshot.user_profiles.len(),
            users_with_interactions: snapshot.user_interactions.len(),
        };

        let profiles = snapshot
            .user_profiles
            .into_iter()
            .map(|(user_id, mut profile)| {
                ProfileStore::recompute(&mut profile, &self.catalog);
                (user_id, profile)
            })
            .collect();
        self.profiles.replace_all(profiles);
        self.interactions.replace_all(snapshot.user_interactions);

        tracing::info!(
            path = %path.display(),
            profiles = summary.profiles,
            "Snapshot restored"
        );

        Ok(summary)
    }
}
