//! Tolerant parsing of the engine's extracted content.
//!
//! The LLM's output is untrusted: it may be missing, malformed JSON, a bare
//! scalar, or an array wrapping the object of interest. None of these are
//! fatal — they all reduce to an empty [`ExtractedPlace`], which the
//! orchestrator treats as a failed attempt.

use serde_json::Value;

use crate::types::ExtractedPlace;

/// Parses the raw `extracted_content` string into an [`ExtractedPlace`].
///
/// A top-level array is unwrapped to its first element. Malformed or absent
/// JSON, and non-object payloads, produce the empty record. Never fails.
#[must_use]
pub fn parse_extracted(content: Option<&str>) -> ExtractedPlace {
    let Some(raw) = content.map(str::trim).filter(|s| !s.is_empty()) else {
        return ExtractedPlace::default();
    };

    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "failed to parse extracted JSON");
            return ExtractedPlace::default();
        }
    };

    let object = match value {
        Value::Array(items) => match items.into_iter().next() {
            Some(first) => first,
            None => return ExtractedPlace::default(),
        },
        other => other,
    };

    if !object.is_object() {
        return ExtractedPlace::default();
    }

    ExtractedPlace {
        name: string_field(&object, "name"),
        address: string_field(&object, "address"),
        formatted_address: string_field(&object, "formatted_address"),
        phone: string_field(&object, "phone"),
        website: string_field(&object, "website"),
        category: string_field(&object, "category"),
    }
}

/// Reads a string field from the payload; wrong-typed values read as absent.
fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(ToOwned::to_owned)
}
