//! Normalization from the raw extraction payload to [`PlaceResult`].

use crate::category::classify;
use crate::types::{ExtractedPlace, PlaceResult};

/// Converts a raw [`ExtractedPlace`] into the canonical [`PlaceResult`].
///
/// `address` and `formatted_address` converge on whichever one was supplied
/// (preferring an explicit `formatted_address` for the latter); category is
/// classified onto the closed set. Assumes the caller has already verified a
/// non-blank name. Never fails.
#[must_use]
pub fn to_place_result(payload: &ExtractedPlace) -> PlaceResult {
    let address = payload
        .address
        .clone()
        .or_else(|| payload.formatted_address.clone());
    let formatted_address = payload.formatted_address.clone().or_else(|| address.clone());

    PlaceResult {
        name: payload.name().unwrap_or_default().to_string(),
        address,
        formatted_address,
        phone: payload.phone.clone(),
        website: payload.website.clone(),
        category: classify(payload.category.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::PlaceCategory;

    fn named(name: &str) -> ExtractedPlace {
        ExtractedPlace {
            name: Some(name.to_string()),
            ..ExtractedPlace::default()
        }
    }

    #[test]
    fn formatted_address_backfills_address() {
        let payload = ExtractedPlace {
            formatted_address: Some("123 Main".to_string()),
            ..named("X")
        };
        let result = to_place_result(&payload);
        assert_eq!(result.address.as_deref(), Some("123 Main"));
        assert_eq!(result.formatted_address.as_deref(), Some("123 Main"));
    }

    #[test]
    fn address_backfills_formatted_address() {
        let payload = ExtractedPlace {
            address: Some("5 Ave".to_string()),
            ..named("X")
        };
        let result = to_place_result(&payload);
        assert_eq!(result.address.as_deref(), Some("5 Ave"));
        assert_eq!(result.formatted_address.as_deref(), Some("5 Ave"));
    }

    #[test]
    fn explicit_formatted_address_wins_over_backfill() {
        let payload = ExtractedPlace {
            address: Some("5 Ave".to_string()),
            formatted_address: Some("5th Avenue, NYC".to_string()),
            ..named("X")
        };
        let result = to_place_result(&payload);
        assert_eq!(result.address.as_deref(), Some("5 Ave"));
        assert_eq!(result.formatted_address.as_deref(), Some("5th Avenue, NYC"));
    }

    #[test]
    fn both_addresses_absent_stay_absent() {
        let result = to_place_result(&named("X"));
        assert_eq!(result.address, None);
        assert_eq!(result.formatted_address, None);
    }

    #[test]
    fn phone_and_website_pass_through() {
        let payload = ExtractedPlace {
            phone: Some("+1 555 0100".to_string()),
            website: Some("https://x.example.com".to_string()),
            ..named("X")
        };
        let result = to_place_result(&payload);
        assert_eq!(result.phone.as_deref(), Some("+1 555 0100"));
        assert_eq!(result.website.as_deref(), Some("https://x.example.com"));
    }

    #[test]
    fn category_is_classified() {
        let payload = ExtractedPlace {
            category: Some("Italian Bistro".to_string()),
            ..named("X")
        };
        let result = to_place_result(&payload);
        assert_eq!(result.category, Some(PlaceCategory::Restaurant));
    }

    #[test]
    fn absent_category_stays_absent() {
        let result = to_place_result(&named("X"));
        assert_eq!(result.category, None);
    }

    #[test]
    fn name_is_trimmed() {
        let result = to_place_result(&named("  Blue Door  "));
        assert_eq!(result.name, "Blue Door");
    }
}
