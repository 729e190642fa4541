use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use thiserror::Error;

use crate::models::{
    CatalogDocument, CatalogItem, Category, CategoryDefinition, CategoryId, ItemId, Listing,
};

/// Sample home-services catalog bundled with the binary
pub const BUNDLED_CATALOG: &str = include_str!("../../data/catalog.json");

/// Error types for catalog loading
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog defines no categories")]
    NoCategories,
    #[error("Category {0} has a blank name")]
    BlankCategory(CategoryId),
    #[error("Duplicate category name: {0}")]
    DuplicateCategory(String),
    #[error("Duplicate item id: {0}")]
    DuplicateItem(ItemId),
    #[error("Item {id} has an invalid {field}: {value}")]
    InvalidField {
        id: ItemId,
        field: &'static str,
        value: f64,
    },
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed catalog document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Case folding shared by every category-name comparison
fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Assigns each listing to exactly one category id
///
/// Per listing, in priority order:
/// 1. an explicit `category_name` label matching a category case-insensitively
/// 2. the first category (definition order) whose name occurs in the description
/// 3. the `fallback` category if it exists, otherwise id 0
///
/// `category_names` must be non-empty for the returned ids to be valid.
pub fn assign_categories(
    items: &[Listing],
    category_names: &[String],
    fallback: Option<&str>,
) -> Vec<CategoryId> {
    let lowered: Vec<String> = category_names.iter().map(|n| fold(n)).collect();

    let fallback_id = fallback
        .and_then(|name| {
            let name = fold(name);
            lowered.iter().position(|n| *n == name)
        })
        .unwrap_or(0);

    items
        .iter()
        .map(|item| {
            let by_label = item.category_name.as_deref().and_then(|label| {
                let label = fold(label);
                lowered.iter().position(|n| *n == label)
            });

            by_label
                .or_else(|| {
                    let desc = item.desc.to_lowercase();
                    lowered.iter().position(|n| desc.contains(n.as_str()))
                })
                .unwrap_or(fallback_id)
        })
        .collect()
}

/// Min-max scales prices into [0, 1]; all zeros when every price is equal
fn normalize_prices(prices: &[f64]) -> Vec<f64> {
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    prices
        .iter()
        .map(|price| if range > 0.0 { (price - min) / range } else { 0.0 })
        .collect()
}

/// Read-only index of categories and categorized catalog items
///
/// Built once per catalog load; the category mapping cannot change afterwards.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
    categories: Vec<Category>,
    by_name: HashMap<String, CategoryId>,
    by_folded_name: HashMap<String, CategoryId>,
    items: Vec<CatalogItem>,
    positions: HashMap<ItemId, usize>,
    mean_price: f64,
}

impl CatalogIndex {
    /// Builds the index from category cards and listings
    pub fn build(
        definitions: &[CategoryDefinition],
        listings: &[Listing],
        fallback: Option<&str>,
    ) -> Result<Self, CatalogError> {
        if definitions.is_empty() {
            return Err(CatalogError::NoCategories);
        }

        let mut categories = Vec::with_capacity(definitions.len());
        let mut by_name = HashMap::with_capacity(definitions.len());
        let mut by_folded_name = HashMap::with_capacity(definitions.len());
        for (id, definition) in definitions.iter().enumerate() {
            let name = definition.title.trim().to_string();
            if name.is_empty() {
                return Err(CatalogError::BlankCategory(id));
            }
            // names differing only by case would make label matching ambiguous
            if by_folded_name.insert(fold(&name), id).is_some() {
                return Err(CatalogError::DuplicateCategory(name));
            }
            by_name.insert(name.clone(), id);
            categories.push(Category { id, name });
        }

        let mut seen = HashSet::with_capacity(listings.len());
        for listing in listings {
            if !seen.insert(listing.id) {
                return Err(CatalogError::DuplicateItem(listing.id));
            }
            if !(listing.price >= 0.0 && listing.price.is_finite()) {
                return Err(CatalogError::InvalidField {
                    id: listing.id,
                    field: "price",
                    value: listing.price,
                });
            }
            if !(0.0..=5.0).contains(&listing.star) {
                return Err(CatalogError::InvalidField {
                    id: listing.id,
                    field: "rating",
                    value: listing.star,
                });
            }
        }

        let names: Vec<String> = categories.iter().map(|c| c.name.clone()).collect();
        let assigned = assign_categories(listings, &names, fallback);

        let prices: Vec<f64> = listings.iter().map(|l| l.price).collect();
        let normalized = normalize_prices(&prices);

        let items: Vec<CatalogItem> = listings
            .iter()
            .zip(assigned)
            .zip(normalized)
            .map(|((listing, category_id), normalized_price)| CatalogItem {
                id: listing.id,
                description: listing.desc.clone(),
                price: listing.price,
                rating: listing.star,
                category_id,
                normalized_price,
                is_urgent: listing.has_urgent,
                service_area: listing.service_area.clone().unwrap_or_default(),
                provider: listing.username.clone().unwrap_or_default(),
            })
            .collect();

        let positions = items
            .iter()
            .enumerate()
            .map(|(position, item)| (item.id, position))
            .collect();

        let mean_price = if prices.is_empty() {
            0.0
        } else {
            prices.iter().sum::<f64>() / prices.len() as f64
        };

        tracing::info!(
            categories = categories.len(),
            items = items.len(),
            "Catalog index built"
        );

        Ok(Self {
            categories,
            by_name,
            by_folded_name,
            items,
            positions,
            mean_price,
        })
    }

    /// Builds the index from a parsed catalog document
    pub fn from_document(
        document: &CatalogDocument,
        fallback: Option<&str>,
    ) -> Result<Self, CatalogError> {
        Self::build(&document.categories, &document.gigs, fallback)
    }

    /// Parses and indexes a catalog document from JSON text
    pub fn from_json(json: &str, fallback: Option<&str>) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::from_document(&document, fallback)
    }

    /// Reads and indexes a catalog document from disk
    pub fn from_path(path: impl AsRef<Path>, fallback: Option<&str>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, fallback)
    }

    /// Indexes the sample catalog shipped in `data/catalog.json`
    pub fn bundled(fallback: Option<&str>) -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG, fallback)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Exact-name category lookup
    pub fn category_id(&self, name: &str) -> Option<CategoryId> {
        self.by_name.get(name).copied()
    }

    pub fn category_name(&self, id: CategoryId) -> Option<&str> {
        self.categories.get(id).map(|c| c.name.as_str())
    }

    /// Resolves a user-supplied label to its canonical category, ignoring case
    pub fn resolve_category(&self, label: &str) -> Option<&Category> {
        self.by_folded_name
            .get(&fold(label))
            .and_then(|&id| self.categories.get(id))
    }

    /// Items in catalog load order
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&CatalogItem> {
        self.positions.get(&id).and_then(|&pos| self.items.get(pos))
    }

    /// Mean price over every item in the catalog
    pub fn mean_price(&self) -> f64 {
        self.mean_price
    }

    /// Category name -> id, as persisted in snapshots
    pub fn category_mapping(&self) -> BTreeMap<String, CategoryId> {
        self.categories
            .iter()
            .map(|c| (c.name.clone(), c.id))
            .collect()
    }
}
