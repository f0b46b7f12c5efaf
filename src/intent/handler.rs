//! Dispatch of extracted intents against the generator and stores.

use super::conversation::{ChatMessage, ConversationStore, CONTEXT_WINDOW};
use super::extract::extract_intent;
use super::models::{Intent, RulesetSelector};
use crate::curation::{PlaylistCreated, PlaylistGenerator};
use crate::ruleset::{Ruleset, RulesetStore};
use anyhow::Result;
use rand::Rng;
use std::sync::Arc;
use tracing::info;

/// What an intent dispatch produced, in a form a chat layer can relay.
#[derive(Debug)]
pub enum IntentOutcome {
    PlaylistCreated(PlaylistCreated),
    RulesetCreated(Ruleset),
    RulesetUpdated(Ruleset),
    RulesetDeleted { name: String },
    Rulesets(Vec<Ruleset>),
    /// Plain reply: either the input text carried no intent, or the
    /// operation was rejected with a user-facing reason.
    Message(String),
}

impl IntentOutcome {
    pub fn summary(&self) -> String {
        match self {
            IntentOutcome::PlaylistCreated(created) => format!(
                "Created playlist '{}' with {} items: {}",
                created.name, created.items_count, created.url
            ),
            IntentOutcome::RulesetCreated(ruleset) => {
                format!("Created ruleset '{}'", ruleset.name)
            }
            IntentOutcome::RulesetUpdated(ruleset) => {
                format!("Updated ruleset '{}'", ruleset.name)
            }
            IntentOutcome::RulesetDeleted { name } => format!("Deleted ruleset '{}'", name),
            IntentOutcome::Rulesets(rulesets) => {
                if rulesets.is_empty() {
                    "No rulesets defined".to_string()
                } else {
                    let names: Vec<&str> = rulesets.iter().map(|r| r.name.as_str()).collect();
                    format!("{} rulesets: {}", rulesets.len(), names.join(", "))
                }
            }
            IntentOutcome::Message(text) => text.clone(),
        }
    }
}

/// Consumes model responses, executes any embedded intent, and keeps the
/// conversation history current.
pub struct IntentHandler {
    generator: PlaylistGenerator,
    rulesets: Arc<dyn RulesetStore>,
    conversations: Arc<dyn ConversationStore>,
}

impl IntentHandler {
    pub fn new(
        generator: PlaylistGenerator,
        rulesets: Arc<dyn RulesetStore>,
        conversations: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            generator,
            rulesets,
            conversations,
        }
    }

    /// Recent history to hand to a model as conversational context.
    pub fn context(&self, user_id: &str) -> Result<Vec<ChatMessage>> {
        self.conversations.recent(user_id, CONTEXT_WINDOW)
    }

    pub fn history(&self, user_id: &str) -> Result<Vec<ChatMessage>> {
        self.conversations.history(user_id)
    }

    /// Record the text, execute any intent it carries, and record the reply.
    ///
    /// Policy rejections (conflicts, not-found, empty results) come back as
    /// [`IntentOutcome::Message`]; infrastructure failures are errors.
    pub async fn handle<R: Rng + Send>(
        &self,
        user_id: &str,
        text: &str,
        rng: &mut R,
    ) -> Result<IntentOutcome> {
        self.conversations.append(user_id, ChatMessage::user(text))?;

        let outcome = match extract_intent(text)? {
            Some(intent) => {
                info!(user_id, intent = intent.kind(), "Dispatching intent");
                self.dispatch(intent, rng).await?
            }
            None => IntentOutcome::Message(text.to_string()),
        };

        self.conversations
            .append(user_id, ChatMessage::assistant(outcome.summary()))?;
        Ok(outcome)
    }

    async fn dispatch<R: Rng + Send>(&self, intent: Intent, rng: &mut R) -> Result<IntentOutcome> {
        match intent {
            Intent::CreatePlaylist(request) => {
                match self.generator.generate(request, rng).await {
                    Ok(created) => Ok(IntentOutcome::PlaylistCreated(created)),
                    Err(e) if e.is_rejection() => Ok(IntentOutcome::Message(e.to_string())),
                    Err(e) => Err(e.into()),
                }
            }
            Intent::CreateRuleset(new) => {
                if self.rulesets.get_by_name(&new.name)?.is_some() {
                    return Ok(IntentOutcome::Message(format!(
                        "Ruleset '{}' already exists",
                        new.name
                    )));
                }
                Ok(IntentOutcome::RulesetCreated(self.rulesets.create(new)?))
            }
            Intent::UpdateRuleset(change) => {
                let existing = match self.find(&change.identifier)? {
                    Some(ruleset) => ruleset,
                    None => {
                        return Ok(IntentOutcome::Message(format!(
                            "Ruleset '{}' not found",
                            change.identifier
                        )))
                    }
                };
                if let Some(new_name) = &change.update.name {
                    if *new_name != existing.name
                        && self.rulesets.get_by_name(new_name)?.is_some()
                    {
                        return Ok(IntentOutcome::Message(format!(
                            "Ruleset '{}' already exists",
                            new_name
                        )));
                    }
                }
                match self.rulesets.update(existing.id, change.update)? {
                    Some(updated) => Ok(IntentOutcome::RulesetUpdated(updated)),
                    None => Ok(IntentOutcome::Message(format!(
                        "Ruleset '{}' not found",
                        change.identifier
                    ))),
                }
            }
            Intent::DeleteRuleset(target) => {
                let existing = match self.find(&target.identifier)? {
                    Some(ruleset) => ruleset,
                    None => {
                        return Ok(IntentOutcome::Message(format!(
                            "Ruleset '{}' not found",
                            target.identifier
                        )))
                    }
                };
                self.rulesets.delete(existing.id)?;
                Ok(IntentOutcome::RulesetDeleted {
                    name: existing.name,
                })
            }
            Intent::ListRulesets => Ok(IntentOutcome::Rulesets(self.rulesets.list()?)),
        }
    }

    fn find(&self, identifier: &str) -> Result<Option<Ruleset>> {
        match RulesetSelector::parse(identifier) {
            RulesetSelector::Id(id) => self.rulesets.get_by_id(id),
            RulesetSelector::Name(name) => self.rulesets.get_by_name(&name),
        }
    }
}
