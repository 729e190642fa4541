use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CategoryId, InteractionTable, UserProfile};

/// Error types for snapshot persistence
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Snapshot category mapping does not match the loaded catalog")]
    CategoryMismatch,
    #[error("Profile stored under {key} belongs to {user_id}")]
    ProfileKeyMismatch { key: String, user_id: String },
    #[error("Profile {user_id} has a feature vector of length {actual}, expected {expected}")]
    VectorLength {
        user_id: String,
        actual: usize,
        expected: usize,
    },
}

/// On-disk form of the engine state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub category_mapping: BTreeMap<String, CategoryId>,
    pub user_profiles: BTreeMap<String, UserProfile>,
    pub user_interactions: InteractionTable,
}

impl Snapshot {
    /// Writes the snapshot as pretty-printed JSON, replacing any existing file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        tracing::info!(
            path = %path.display(),
            profiles = self.user_profiles.len(),
            "Snapshot saved"
        );

        Ok(())
    }

    /// Reads and parses a snapshot; nothing is applied to engine state here
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&json)?;

        tracing::debug!(
            path = %path.display(),
            profiles = snapshot.user_profiles.len(),
            "Snapshot read"
        );

        Ok(snapshot)
    }

    /// Checks the snapshot was taken against the given category mapping and that
    /// every profile is filed under its own id
    pub fn validate(
        &self,
        category_mapping: &BTreeMap<String, CategoryId>,
    ) -> Result<(), SnapshotError> {
        if &self.category_mapping != category_mapping {
            return Err(SnapshotError::CategoryMismatch);
        }

        let expected = category_mapping.len();
        for (user_id, profile) in &self.user_profiles {
            if &profile.user_id != user_id {
                return Err(SnapshotError::ProfileKeyMismatch {
                    key: user_id.clone(),
                    user_id: profile.user_id.clone(),
                });
            }
            if profile.feature_vector.len() != expected {
                return Err(SnapshotError::VectorLength {
                    user_id: user_id.clone(),
                    actual: profile.feature_vector.len(),
                    expected,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> BTreeMap<String, CategoryId> {
        [("Plumbing".to_string(), 0), ("HVAC".to_string(), 1)]
            .into_iter()
            .collect()
    }

    fn snapshot() -> Snapshot {
        let mut profile = UserProfile::new("u1", "John", 2);
        profile.feature_vector = vec![1.0, 0.0];
        profile.preferences.set("Plumbing", 1.0);

        let mut interactions = InteractionTable::new();
        interactions
            .entry("u1".to_string())
            .or_default()
            .entry(2)
            .or_default()
            .insert("book".to_string(), 1.0);

        Snapshot {
            category_mapping: mapping(),
            user_profiles: [("u1".to_string(), profile)].into_iter().collect(),
            user_interactions: interactions,
        }
    }

    #[test]
    fn test_document_has_exactly_three_keys() {
        let value = serde_json::to_value(snapshot()).unwrap();
        let mut keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["category_mapping", "user_interactions", "user_profiles"]
        );
        assert_eq!(value["user_interactions"]["u1"]["2"]["book"], 1.0);
        assert_eq!(value["user_profiles"]["u1"]["feature_vector"][0], 1.0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let original = snapshot();
        original.save(&path).unwrap();
        let restored = Snapshot::load(&path).unwrap();

        assert_eq!(restored, original);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Snapshot::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(SnapshotError::Io(_))));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"category_mapping\": ").unwrap();

        let result = Snapshot::load(&path);
        assert!(matches!(result, Err(SnapshotError::Malformed(_))));
    }

    #[test]
    fn test_validate() {
        let snapshot = snapshot();
        assert!(snapshot.validate(&mapping()).is_ok());

        let other: BTreeMap<String, CategoryId> =
            [("Cleaning".to_string(), 0)].into_iter().collect();
        assert!(matches!(
            snapshot.validate(&other),
            Err(SnapshotError::CategoryMismatch)
        ));
    }

    #[test]
    fn test_validate_vector_length() {
        let mut snapshot = snapshot();
        if let Some(profile) = snapshot.user_profiles.get_mut("u1") {
            profile.feature_vector.push(0.0);
        }
        assert!(matches!(
            snapshot.validate(&mapping()),
            Err(SnapshotError::VectorLength { .. })
        ));
    }

    #[test]
    fn test_validate_profile_key() {
        let mut snapshot = snapshot();
        if let Some(profile) = snapshot.user_profiles.remove("u1") {
            snapshot.user_profiles.insert("u2".to_string(), profile);
        }
        assert!(matches!(
            snapshot.validate(&mapping()),
            Err(SnapshotError::ProfileKeyMismatch { .. })
        ));
    }
}
