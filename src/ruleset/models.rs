//! Ruleset models.

use serde::{Deserialize, Serialize};

/// How source-playlist material combines with sampled tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Source material is appended to the sampled tracks.
    Supplement,
    /// Source material stands in for sampling entirely.
    Replace,
}

impl SourceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceMode::Supplement => "supplement",
            SourceMode::Replace => "replace",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "supplement" => Some(SourceMode::Supplement),
            "replace" => Some(SourceMode::Replace),
            _ => None,
        }
    }
}

impl Default for SourceMode {
    fn default() -> Self {
        SourceMode::Supplement
    }
}

/// Release-date and genre constraints a ruleset can impose.
///
/// All fields are optional; an empty criteria set filters nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesetCriteria {
    /// Keep items released in this year or earlier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_year: Option<i32>,

    /// Keep items released in this year or later.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_year: Option<i32>,

    /// Rolling window; overrides `min_year` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_back: Option<i32>,

    /// Keep items whose artists carry a matching genre.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre_filter: Option<Vec<String>>,
}

impl RulesetCriteria {
    pub fn is_empty(&self) -> bool {
        self.max_year.is_none()
            && self.min_year.is_none()
            && self.years_back.is_none()
            && self.genre_filter.is_none()
    }
}

/// A persisted curation ruleset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ruleset {
    pub id: i64,
    pub name: String,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub criteria: RulesetCriteria,
    #[serde(default)]
    pub source_playlist_names: Vec<String>,
    #[serde(default)]
    pub source_mode: SourceMode,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields for creating a ruleset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRuleset {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub criteria: RulesetCriteria,
    #[serde(default)]
    pub source_playlist_names: Vec<String>,
    #[serde(default)]
    pub source_mode: SourceMode,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

/// Partial update for an existing ruleset. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesetUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub criteria: Option<RulesetCriteria>,
    #[serde(default)]
    pub source_playlist_names: Option<Vec<String>>,
    #[serde(default)]
    pub source_mode: Option<SourceMode>,
    #[serde(default)]
    pub is_active: Option<bool>,
}
