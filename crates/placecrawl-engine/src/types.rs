//! Shared types for the extraction pipeline.

use std::sync::LazyLock;

use serde::Serialize;
use serde_json::{json, Value};

use crate::category::PlaceCategory;

/// Instruction text passed to the LLM alongside the extraction schema.
pub const EXTRACTION_INSTRUCTION: &str = "Extract a single physical place or business \
described on the page. Fill every field if present. The category must be exactly one of \
restaurant, bar, cafe, hotel, landmark, attraction, other.";

/// The structural contract the extraction engine is instructed to fill.
///
/// Built once per process from the canonical response field set; immutable.
pub static EXTRACTION_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string", "description": "Business or place name" },
            "address": { "type": "string", "description": "Full mailing address for the place" },
            "phone": {
                "type": "string",
                "description": "Formatted phone number including country/area code"
            },
            "website": { "type": "string", "description": "Canonical website URL" },
            "category": {
                "type": "string",
                "enum": ["restaurant", "bar", "cafe", "hotel", "landmark", "attraction", "other"],
                "description": "One of restaurant, bar, cafe, hotel, landmark, attraction, other"
            }
        },
        "required": ["name", "address"]
    })
});

/// Raw extraction payload as an explicit optional-field record.
///
/// Produced by [`crate::payload::parse_extracted`]; any field the engine did
/// not return (or returned with the wrong type) is simply `None`. An entirely
/// empty record is how a malformed or missing payload is represented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPlace {
    pub name: Option<String>,
    pub address: Option<String>,
    pub formatted_address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
}

impl ExtractedPlace {
    /// The extracted place name, if it is present and non-blank.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Canonical crawl output returned to API callers.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlaceResult {
    pub name: String,
    pub address: Option<String>,
    pub formatted_address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub category: Option<PlaceCategory>,
}
