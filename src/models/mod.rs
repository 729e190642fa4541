pub mod catalog;
pub mod interaction;
pub mod profile;

pub use catalog::{
    CatalogDocument, CatalogItem, Category, CategoryDefinition, CategoryId, ItemId, Listing,
};
pub use interaction::{InteractionTable, InteractionType};
pub use profile::{Preferences, UserProfile};
