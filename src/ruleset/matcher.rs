//! Keyword matching of free-text guidelines against rulesets.

use super::models::Ruleset;

/// Outcome of matching guidelines against a set of rulesets.
#[derive(Debug, Clone, Default)]
pub struct RulesetMatch {
    /// Rulesets that fired, in their input order.
    pub matched: Vec<Ruleset>,

    /// The keyword that triggered each match, parallel to `matched`.
    pub keywords_found: Vec<String>,
}

impl RulesetMatch {
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }

    pub fn matched_names(&self) -> Vec<String> {
        self.matched.iter().map(|r| r.name.clone()).collect()
    }
}

/// Select the active rulesets with at least one keyword occurring as a
/// case-insensitive substring of the guidelines text.
///
/// Each ruleset matches at most once (its first firing keyword is recorded)
/// and matching is independent per ruleset, so the result preserves the
/// input order.
pub fn match_rulesets(guidelines: &str, rulesets: &[Ruleset]) -> RulesetMatch {
    let guidelines_lower = guidelines.to_lowercase();
    let mut result = RulesetMatch::default();

    for ruleset in rulesets {
        if !ruleset.is_active {
            continue;
        }
        for keyword in &ruleset.keywords {
            if guidelines_lower.contains(&keyword.to_lowercase()) {
                result.matched.push(ruleset.clone());
                result.keywords_found.push(keyword.clone());
                break;
            }
        }
    }

    result
}
