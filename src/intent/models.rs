//! Structured intents consumed from a generative model's output.

use crate::curation::GenerationRequest;
use crate::ruleset::{NewRuleset, RulesetUpdate};
use serde::{Deserialize, Serialize};

/// A playlist or ruleset operation requested through conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    CreatePlaylist(GenerationRequest),
    CreateRuleset(NewRuleset),
    UpdateRuleset(RulesetChange),
    DeleteRuleset(RulesetTarget),
    ListRulesets,
}

impl Intent {
    pub fn kind(&self) -> &'static str {
        match self {
            Intent::CreatePlaylist(_) => "create_playlist",
            Intent::CreateRuleset(_) => "create_ruleset",
            Intent::UpdateRuleset(_) => "update_ruleset",
            Intent::DeleteRuleset(_) => "delete_ruleset",
            Intent::ListRulesets => "list_rulesets",
        }
    }
}

/// Update payload: which ruleset, and the fields to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetChange {
    pub identifier: String,
    #[serde(flatten)]
    pub update: RulesetUpdate,
}

/// Delete payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetTarget {
    pub identifier: String,
}

/// How a conversational identifier picks a ruleset: an all-digit string is
/// an id, anything else is a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesetSelector {
    Id(i64),
    Name(String),
}

impl RulesetSelector {
    pub fn parse(identifier: &str) -> Self {
        let trimmed = identifier.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(id) = trimmed.parse::<i64>() {
                return RulesetSelector::Id(id);
            }
        }
        RulesetSelector::Name(trimmed.to_string())
    }
}
