//! Search index definitions
//!
//! The engine must carry these three index configurations before any search
//! runs. They are exposed as data for the provisioning tooling; the search
//! path only refers to them by name.

use serde_json::{json, Map, Value};

/// Full catalog index used by standard search
pub const MOVIES_INDEX: &str = "movies";
/// Title/plot index used by title-weighted search
pub const TITLE_WEIGHT_INDEX: &str = "movies_title_weight";
/// Title-only index used by autocomplete
pub const AUTOCOMPLETE_INDEX: &str = "movies_autocomplete";

/// Shortest n-gram indexed for autocomplete fields
pub const MIN_GRAMS: u8 = 2;
/// Longest n-gram indexed for autocomplete fields
pub const MAX_GRAMS: u8 = 20;

/// How a single document field is indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMapping {
    Autocomplete { min_grams: u8, max_grams: u8 },
    String,
    Number,
}

impl FieldMapping {
    const TITLE: FieldMapping = FieldMapping::Autocomplete {
        min_grams: MIN_GRAMS,
        max_grams: MAX_GRAMS,
    };

    fn to_json(self) -> Value {
        match self {
            FieldMapping::Autocomplete {
                min_grams,
                max_grams,
            } => json!({
                "type": "autocomplete",
                "minGrams": min_grams,
                "maxGrams": max_grams,
            }),
            FieldMapping::String => json!({ "type": "string" }),
            FieldMapping::Number => json!({ "type": "number" }),
        }
    }
}

/// A named static index mapping
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    pub name: &'static str,
    pub fields: Vec<(&'static str, FieldMapping)>,
}

impl IndexDefinition {
    /// Render as a `createSearchIndexes` entry
    pub fn to_json(&self) -> Value {
        let fields: Map<String, Value> = self
            .fields
            .iter()
            .map(|(path, mapping)| (path.to_string(), mapping.to_json()))
            .collect();

        json!({
            "name": self.name,
            "definition": {
                "mappings": {
                    "dynamic": false,
                    "fields": fields,
                }
            }
        })
    }

    /// Mapping for a document path, if the index covers it
    pub fn field(&self, path: &str) -> Option<FieldMapping> {
        self.fields
            .iter()
            .find(|(name, _)| *name == path)
            .map(|(_, mapping)| *mapping)
    }
}

/// The three indexes the search service depends on
pub fn definitions() -> Vec<IndexDefinition> {
    vec![
        IndexDefinition {
            name: MOVIES_INDEX,
            fields: vec![
                ("title", FieldMapping::TITLE),
                ("plot", FieldMapping::String),
                ("year", FieldMapping::Number),
                ("runtime", FieldMapping::Number),
                ("imdb.rating", FieldMapping::Number),
                ("genres", FieldMapping::String),
            ],
        },
        IndexDefinition {
            name: TITLE_WEIGHT_INDEX,
            fields: vec![
                ("title", FieldMapping::TITLE),
                ("plot", FieldMapping::String),
            ],
        },
        IndexDefinition {
            name: AUTOCOMPLETE_INDEX,
            fields: vec![("title", FieldMapping::TITLE)],
        },
    ]
}
