mod matcher;
mod models;
mod resolver;
mod schema;
mod store;

pub use matcher::{match_rulesets, RulesetMatch};
pub use models::{NewRuleset, Ruleset, RulesetCriteria, RulesetUpdate, SourceMode};
pub use resolver::{resolve_window, DateWindow};
pub use store::{RulesetStore, SqliteRulesetStore};
