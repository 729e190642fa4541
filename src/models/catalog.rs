use serde::{Deserialize, Serialize};

/// Identifier of a catalog item (gig)
pub type ItemId = u64;

/// Dense category identifier, assigned in catalog load order
pub type CategoryId = usize;

/// A classification bucket for catalog items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A scored-ready catalog item, produced by the catalog index at load time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: ItemId,
    pub description: String,
    /// Price in whole currency units
    pub price: f64,
    /// Star rating in [0, 5]
    pub rating: f64,
    pub category_id: CategoryId,
    /// Min-max scaled price over the loaded catalog
    pub normalized_price: f64,
    /// Offers same-day / emergency service
    pub is_urgent: bool,
    /// Free-text description of where the provider works
    pub service_area: String,
    /// Seller display name
    pub provider: String,
}

impl CatalogItem {
    /// Whether the free-text service area mentions the given location token
    pub fn serves(&self, location: &str) -> bool {
        !location.is_empty() && self.service_area.contains(location)
    }
}

// ============================================================================
// Catalog document (input format)
// ============================================================================

/// A category card as it appears in the catalog document
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDefinition {
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
}

/// A gig listing as it appears in the catalog document
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    pub id: ItemId,
    #[serde(alias = "description")]
    pub desc: String,
    pub price: f64,
    #[serde(alias = "rating")]
    pub star: f64,
    #[serde(default)]
    pub username: Option<String>,
    /// Explicit category label; matched case-insensitively against category names
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default, rename = "hasUrgent", alias = "is_urgent")]
    pub has_urgent: bool,
    #[serde(default, rename = "serviceArea", alias = "service_area")]
    pub service_area: Option<String>,
}

/// Complete catalog document: category cards plus gig listings
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogDocument {
    #[serde(alias = "cards")]
    pub categories: Vec<CategoryDefinition>,
    pub gigs: Vec<Listing>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_accepts_original_field_names() {
        let json = r#"{
            "id": 7,
            "desc": "Emergency plumbing",
            "price": 150,
            "star": 4.8,
            "username": "Drain Rescue",
            "hasUrgent": true,
            "serviceArea": "Oak Park"
        }"#;

        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.id, 7);
        assert_eq!(listing.star, 4.8);
        assert!(listing.has_urgent);
        assert_eq!(listing.service_area.as_deref(), Some("Oak Park"));
        assert!(listing.category_name.is_none());
    }

    #[test]
    fn test_listing_accepts_aliases_and_defaults() {
        let json = r#"{"id": 1, "description": "Lawn care", "price": 20, "rating": 3}"#;

        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.desc, "Lawn care");
        assert_eq!(listing.star, 3.0);
        assert!(!listing.has_urgent);
        assert!(listing.service_area.is_none());
    }

    #[test]
    fn test_serves_requires_non_empty_token() {
        let item = CatalogItem {
            id: 1,
            description: "Pipes".to_string(),
            price: 10.0,
            rating: 5.0,
            category_id: 0,
            normalized_price: 0.0,
            is_urgent: false,
            service_area: "Chicago 60601".to_string(),
            provider: "Mike".to_string(),
        };

        assert!(item.serves("60601"));
        assert!(!item.serves("60602"));
        assert!(!item.serves(""));
    }
}
