use std::collections::BTreeMap;
use std::fmt::Display;

use super::ItemId;

/// user_id -> item_id -> interaction type -> last recorded strength
pub type InteractionTable = BTreeMap<String, BTreeMap<ItemId, BTreeMap<String, f64>>>;

/// Kind of user action against a catalog item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionType {
    View,
    Click,
    Contact,
    Favorite,
    Book,
    Purchase,
    /// Any label the tracker does not recognize
    Other(String),
}

impl InteractionType {
    /// Parses an interaction label, case-insensitively
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "view" => InteractionType::View,
            "click" => InteractionType::Click,
            "contact" => InteractionType::Contact,
            "favorite" => InteractionType::Favorite,
            "book" => InteractionType::Book,
            "purchase" => InteractionType::Purchase,
            _ => InteractionType::Other(label.to_string()),
        }
    }

    /// Multiplier applied to the interaction strength when folding it into preferences
    pub fn weight(&self) -> f64 {
        match self {
            InteractionType::View => 0.1,
            InteractionType::Click => 0.3,
            InteractionType::Contact | InteractionType::Favorite => 0.7,
            InteractionType::Book | InteractionType::Purchase => 1.0,
            InteractionType::Other(_) => 0.1,
        }
    }
}

impl Display for InteractionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionType::View => write!(f, "view"),
            InteractionType::Click => write!(f, "click"),
            InteractionType::Contact => write!(f, "contact"),
            InteractionType::Favorite => write!(f, "favorite"),
            InteractionType::Book => write!(f, "book"),
            InteractionType::Purchase => write!(f, "purchase"),
            InteractionType::Other(label) => write!(f, "{}", label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_labels() {
        assert_eq!(InteractionType::parse("view"), InteractionType::View);
        assert_eq!(InteractionType::parse("BOOK"), InteractionType::Book);
        assert_eq!(InteractionType::parse(" favorite "), InteractionType::Favorite);
    }

    #[test]
    fn test_weights() {
        assert_eq!(InteractionType::View.weight(), 0.1);
        assert_eq!(InteractionType::Click.weight(), 0.3);
        assert_eq!(InteractionType::Contact.weight(), 0.7);
        assert_eq!(InteractionType::Favorite.weight(), 0.7);
        assert_eq!(InteractionType::Book.weight(), 1.0);
        assert_eq!(InteractionType::Purchase.weight(), 1.0);
    }

    #[test]
    fn test_unknown_label_defaults_to_view_weight() {
        let kind = InteractionType::parse("share");
        assert_eq!(kind, InteractionType::Other("share".to_string()));
        assert_eq!(kind.weight(), 0.1);
        assert_eq!(kind.to_string(), "share");
    }
}
