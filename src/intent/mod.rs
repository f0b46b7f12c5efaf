mod conversation;
mod extract;
mod handler;
mod models;

pub use conversation::{
    ChatMessage, ConversationStore, InMemoryConversationStore, MessageRole, CONTEXT_WINDOW,
    HISTORY_CAP,
};
pub use extract::{extract_intent, parse_intent};
pub use handler::{IntentHandler, IntentOutcome};
pub use models::{Intent, RulesetChange, RulesetSelector, RulesetTarget};
