use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Metadata key holding the document kind
pub const META_TYPE: &str = "type";
/// Metadata key holding the cached answer of an interaction
pub const META_ANSWER: &str = "answer";
pub const META_FARMER_ID: &str = "farmer_id";
pub const META_LOCATION: &str = "location";
pub const META_CREATED_AT: &str = "created_at";

/// Placeholder for profile fields the caller did not supply
pub const UNKNOWN: &str = "unknown";

/// Kind of document held in the vector store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Profile,
    Challenges,
    Query,
    Interaction,
}

impl DocumentType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Challenges => "challenges",
            Self::Query => "query",
            Self::Interaction => "interaction",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metadata value: either text or a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    Number(f64),
}

impl MetadataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

pub type Metadata = HashMap<String, MetadataValue>;

/// A stored document with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            vector,
            metadata: Metadata::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Text value of a metadata field, if present and textual
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(MetadataValue::as_text)
    }

    /// Document kind from the `type` metadata field
    pub fn doc_type(&self) -> Option<DocumentType> {
        match self.meta_str(META_TYPE)? {
            "profile" => Some(DocumentType::Profile),
            "challenges" => Some(DocumentType::Challenges),
            "query" => Some(DocumentType::Query),
            "interaction" => Some(DocumentType::Interaction),
            _ => None,
        }
    }

    /// Stored answer, only when present and non-empty
    pub fn cached_answer(&self) -> Option<&str> {
        self.meta_str(META_ANSWER).filter(|a| !a.trim().is_empty())
    }
}

/// Farmer profile as supplied by the data source or the chat request
///
/// Every field is optional on the wire; missing values render as
/// "Unknown" in prompts and "unknown" in stored metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FarmerProfile {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub crops: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub land_size: Option<String>,
    #[serde(default)]
    pub soil_type: Option<String>,
    #[serde(default)]
    pub irrigation: Option<String>,
    #[serde(default)]
    pub challenges: Option<String>,
    #[serde(default)]
    pub previous_queries: Vec<String>,
}

impl FarmerProfile {
    /// True when nothing about the farmer is known
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn farmer_id_or_unknown(&self) -> &str {
        non_empty(self.id.as_deref()).unwrap_or(UNKNOWN)
    }

    pub fn location_or_unknown(&self) -> &str {
        non_empty(self.location.as_deref()).unwrap_or(UNKNOWN)
    }

    pub fn crops_joined(&self) -> String {
        self.crops.join(", ")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accept ids and land sizes given either as strings or numbers
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Answer language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Punjabi,
}

impl Language {
    /// Parse a request value; anything unrecognised means English
    pub fn from_request(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "hindi" => Self::Hindi,
            "punjabi" => Self::Punjabi,
            _ => Self::English,
        }
    }

    /// Name used inside prompts
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Punjabi => "Punjabi",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_fallback() {
        assert_eq!(Language::from_request("hindi"), Language::Hindi);
        assert_eq!(Language::from_request(" Punjabi "), Language::Punjabi);
        assert_eq!(Language::from_request("english"), Language::English);
        assert_eq!(Language::from_request("tamil"), Language::English);
        assert_eq!(Language::from_request(""), Language::English);
        assert_eq!(Language::Hindi.display_name(), "Hindi");
    }

    #[test]
    fn test_profile_deserializes_partial_and_numeric_fields() {
        let profile: FarmerProfile = serde_json::from_str(
            r#"{"id": 17, "location": "Punjab", "crops": ["Wheat", "Rice"], "land_size": 5}"#,
        )
        .unwrap();

        assert_eq!(profile.id.as_deref(), Some("17"));
        assert_eq!(profile.land_size.as_deref(), Some("5"));
        assert_eq!(profile.crops_joined(), "Wheat, Rice");
        assert!(profile.name.is_none());
        assert!(profile.previous_queries.is_empty());
    }

    #[test]
    fn test_profile_unknown_defaults() {
        let profile = FarmerProfile::default();
        assert!(profile.is_empty());
        assert_eq!(profile.farmer_id_or_unknown(), UNKNOWN);
        assert_eq!(profile.location_or_unknown(), UNKNOWN);

        let blank = FarmerProfile {
            location: Some("  ".to_string()),
            ..FarmerProfile::default()
        };
        assert_eq!(blank.location_or_unknown(), UNKNOWN);
    }

    #[test]
    fn test_cached_answer_requires_non_empty_value() {
        let doc = Document::new("a", "question", vec![1.0])
            .with_metadata(META_TYPE, DocumentType::Interaction.as_str())
            .with_metadata(META_ANSWER, "");
        assert_eq!(doc.doc_type(), Some(DocumentType::Interaction));
        assert!(doc.cached_answer().is_none());

        let doc = doc.with_metadata(META_ANSWER, "Sow wheat in November");
        assert_eq!(doc.cached_answer(), Some("Sow wheat in November"));
    }

    #[test]
    fn test_metadata_value_untagged_serde() {
        let doc = Document::new("a", "t", vec![0.5])
            .with_metadata("land", 2.5)
            .with_metadata(META_LOCATION, "Gujarat");
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.metadata.get("land"), Some(&MetadataValue::Number(2.5)));
        assert_eq!(back.meta_str(META_LOCATION), Some("Gujarat"));
    }
}
