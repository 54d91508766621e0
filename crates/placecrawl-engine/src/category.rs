//! Canonical place categories and free-text classification.

use serde::{Deserialize, Serialize};

/// The closed set of categories a place can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceCategory {
    Restaurant,
    Bar,
    Cafe,
    Hotel,
    Landmark,
    Attraction,
    Other,
}

/// Classification order. Keyword sets overlap (e.g. "cafe bar" contains a
/// bar keyword), so reordering changes results; keep this fixed.
const CATEGORY_ORDER: [PlaceCategory; 7] = [
    PlaceCategory::Restaurant,
    PlaceCategory::Bar,
    PlaceCategory::Cafe,
    PlaceCategory::Hotel,
    PlaceCategory::Landmark,
    PlaceCategory::Attraction,
    PlaceCategory::Other,
];

impl PlaceCategory {
    /// Canonical lowercase name, matching the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PlaceCategory::Restaurant => "restaurant",
            PlaceCategory::Bar => "bar",
            PlaceCategory::Cafe => "cafe",
            PlaceCategory::Hotel => "hotel",
            PlaceCategory::Landmark => "landmark",
            PlaceCategory::Attraction => "attraction",
            PlaceCategory::Other => "other",
        }
    }

    /// Keyword substrings that map a free-text label onto this category.
    fn keywords(self) -> &'static [&'static str] {
        match self {
            PlaceCategory::Restaurant => &["restaurant", "diner", "bistro", "eatery"],
            PlaceCategory::Bar => &["bar", "pub", "brewery", "taproom"],
            PlaceCategory::Cafe => &["cafe", "coffee", "tea", "espresso"],
            PlaceCategory::Hotel => &["hotel", "lodging", "resort", "inn"],
            PlaceCategory::Landmark => &["landmark", "monument", "museum"],
            PlaceCategory::Attraction => &["attraction", "theme park", "zoo", "gallery", "aquarium"],
            PlaceCategory::Other => &[],
        }
    }
}

impl std::fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a free-text category label onto the closed category set.
///
/// Blank or absent labels classify to `None` (category left unset). For each
/// category in the fixed order, an exact match on the canonical name wins
/// first, then any keyword appearing as a substring of the lowered label.
/// Labels that match nothing fall back to [`PlaceCategory::Other`].
#[must_use]
pub fn classify(label: Option<&str>) -> Option<PlaceCategory> {
    let lowered = label?.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    for category in CATEGORY_ORDER {
        if lowered == category.as_str() {
            return Some(category);
        }
        if category
            .keywords()
            .iter()
            .any(|keyword| lowered.contains(keyword))
        {
            return Some(category);
        }
    }
    Some(PlaceCategory::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_label_is_unclassified() {
        assert_eq!(classify(None), None);
    }

    #[test]
    fn blank_label_is_unclassified() {
        assert_eq!(classify(Some("")), None);
        assert_eq!(classify(Some("   ")), None);
    }

    #[test]
    fn exact_canonical_names_classify_to_themselves() {
        for category in CATEGORY_ORDER {
            assert_eq!(classify(Some(category.as_str())), Some(category));
        }
    }

    #[test]
    fn bistro_keyword_maps_to_restaurant() {
        assert_eq!(
            classify(Some("Italian Bistro")),
            Some(PlaceCategory::Restaurant)
        );
    }

    #[test]
    fn pub_keyword_maps_to_bar() {
        assert_eq!(
            classify(Some("Rooftop Pub & Grill")),
            Some(PlaceCategory::Bar)
        );
    }

    #[test]
    fn resort_keyword_maps_to_hotel() {
        assert_eq!(classify(Some("Grand Resort")), Some(PlaceCategory::Hotel));
    }

    #[test]
    fn museum_keyword_maps_to_landmark() {
        assert_eq!(
            classify(Some("Natural History Museum")),
            Some(PlaceCategory::Landmark)
        );
    }

    #[test]
    fn unmatched_label_falls_back_to_other() {
        assert_eq!(
            classify(Some("random gibberish")),
            Some(PlaceCategory::Other)
        );
    }

    #[test]
    fn overlapping_keywords_resolve_in_fixed_order() {
        // "cafe bar" contains keywords for both bar and cafe; bar comes
        // first in the iteration order.
        assert_eq!(classify(Some("cafe bar")), Some(PlaceCategory::Bar));
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify(Some("TAPROOM")), Some(PlaceCategory::Bar));
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&PlaceCategory::Restaurant).unwrap();
        assert_eq!(json, "\"restaurant\"");
    }
}
