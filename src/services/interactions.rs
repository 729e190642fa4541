use std::collections::BTreeMap;

use crate::models::{InteractionTable, InteractionType, ItemId};
use crate::services::catalog::CatalogIndex;
use crate::services::profiles::ProfileStore;

/// Records typed user interactions and folds them into profile preferences
#[derive(Debug, Clone, Default)]
pub struct InteractionTracker {
    table: InteractionTable,
}

impl InteractionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an interaction and, when the user has a profile and the item is
    /// known, adds `weight(kind) * value` to the item category's preference
    ///
    /// Only the latest strength per interaction type is stored. Negative or
    /// non-finite strengths are dropped without being recorded. Returns whether a
    /// profile was updated.
    pub fn track(
        &mut self,
        profiles: &mut ProfileStore,
        catalog: &CatalogIndex,
        user_id: &str,
        item_id: ItemId,
        kind: &InteractionType,
        value: f64,
    ) -> bool {
        if !(value.is_finite() && value >= 0.0) {
            tracing::warn!(user_id = %user_id, item_id, value, "Ignoring invalid interaction strength");
            return false;
        }

        self.table
            .entry(user_id.to_string())
            .or_default()
            .entry(item_id)
            .or_default()
            .insert(kind.to_string(), value);

        tracing::debug!(
            user_id = %user_id,
            item_id,
            interaction = %kind,
            value,
            "Interaction recorded"
        );

        if !profiles.contains(user_id) {
            return false;
        }

        let Some(category) = catalog
            .item(item_id)
            .and_then(|item| catalog.category_name(item.category_id))
        else {
            tracing::debug!(item_id, "Interaction references unknown item");
            return false;
        };

        let delta = kind.weight() * value;
        let updated = profiles.add_preference(catalog, user_id, category, delta);

        if updated {
            tracing::info!(
                user_id = %user_id,
                category = %category,
                delta,
                "Preference updated from interaction"
            );
        }

        updated
    }

    /// Recorded interactions of one user with one item
    pub fn get(&self, user_id: &str, item_id: ItemId) -> Option<&BTreeMap<String, f64>> {
        self.table.get(user_id).and_then(|items| items.get(&item_id))
    }

    pub fn table(&self) -> &InteractionTable {
        &self.table
    }

    pub(crate) fn replace_all(&mut self, table: InteractionTable) {
        self.table = table;
    }
}
