//! Extraction of intent payloads from free-form model responses.
//!
//! Responses usually carry the payload in a fenced code block, but models
//! also emit bare JSON objects mid-sentence; both forms are recognized.

use super::models::{Intent, RulesetChange, RulesetTarget};
use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref FENCED_JSON: Regex =
        Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap();
    static ref BARE_OBJECT: Regex = Regex::new(r#"(?s)\{.*"intent".*\}"#).unwrap();
}

/// Pull the first intent payload out of a response.
///
/// Returns Ok(None) when the text carries no intent, which callers treat as
/// a plain conversational reply. An envelope that names an unknown intent or
/// carries a malformed payload is an error.
pub fn extract_intent(response: &str) -> Result<Option<Intent>> {
    for candidate in candidates(response) {
        let value: Value = match serde_json::from_str(&candidate) {
            Ok(value) => value,
            Err(_) => continue,
        };
        if value.get("intent").is_some() {
            return parse_intent(&value).map(Some);
        }
    }
    Ok(None)
}

fn candidates(response: &str) -> Vec<String> {
    let mut found = Vec::new();
    for captures in FENCED_JSON.captures_iter(response) {
        found.push(captures[1].to_string());
    }
    if let Some(m) = BARE_OBJECT.find(response) {
        found.push(m.as_str().to_string());
    }
    found
}

/// Parse a decoded intent envelope. A missing `data` field means defaults.
pub fn parse_intent(value: &Value) -> Result<Intent> {
    let kind = value
        .get("intent")
        .and_then(Value::as_str)
        .context("Intent field is not a string")?;
    let data = value
        .get("data")
        .cloned()
        .unwrap_or_else(|| Value::Object(Default::default()));

    match kind {
        "create_playlist" => {
            let request = serde_json::from_value(data)
                .context("Failed to parse create_playlist data")?;
            Ok(Intent::CreatePlaylist(request))
        }
        "create_ruleset" => {
            let new = serde_json::from_value(data).context("Failed to parse create_ruleset data")?;
            Ok(Intent::CreateRuleset(new))
        }
        "update_ruleset" => {
            let change: RulesetChange =
                serde_json::from_value(data).context("Failed to parse update_ruleset data")?;
            Ok(Intent::UpdateRuleset(change))
        }
        "delete_ruleset" => {
            let target: RulesetTarget =
                serde_json::from_value(data).context("Failed to parse delete_ruleset data")?;
            Ok(Intent::DeleteRuleset(target))
        }
        "list_rulesets" => Ok(Intent::ListRulesets),
        other => bail!("Unknown intent type: {}", other),
    }
}
