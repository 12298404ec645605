use serde::{Deserialize, Serialize};

/// Dictionary backend reply: either still warming up or a result list.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResponse {
    Loading,
    Entries(Vec<DictionaryEntry>),
}

impl LookupResponse {
    /// The backend answers with the literal string `"loading"` while it starts.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        match value {
            serde_json::Value::String(s) if s == "loading" => Ok(LookupResponse::Loading),
            serde_json::Value::Null => Ok(LookupResponse::Entries(Vec::new())),
            other => serde_json::from_value(other).map(LookupResponse::Entries),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub headword: String,
    #[serde(default)]
    pub reading: Option<String>,
    #[serde(default)]
    pub term_tags: Option<Vec<String>>,
    #[serde(default)]
    pub definitions: Vec<DefinitionBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionBlock {
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub dictionary_name: String,
    #[serde(default)]
    pub content: Vec<String>,
}

/// How the lookup service groups results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupingMode {
    #[default]
    Grouped,
    Flat,
}

impl GroupingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupingMode::Grouped => "grouped",
            GroupingMode::Flat => "flat",
        }
    }
}
