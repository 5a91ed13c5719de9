//! Events that can occur in a chat session

use crate::gateway::{ActionKind, ActionResult, GatewayError};
use crate::llm::LlmError;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    /// Text submitted from the input box
    UserSubmit { text: String },
    /// A quick-action control was pressed
    Trigger { action: ActionKind },

    // Gateway events
    ActionSettled {
        request_id: u64,
        kind: ActionKind,
        outcome: Result<ActionResult, GatewayError>,
    },

    // Free-text chat events
    ReplySettled { outcome: Result<String, LlmError> },
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::UserSubmit { text: text.into() }
    }

    pub fn trigger(action: ActionKind) -> Self {
        Event::Trigger { action }
    }
}
