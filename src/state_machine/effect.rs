//! Effects produced by state transitions

use crate::gateway::{ActionKind, ActionRequest};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a message to the transcript
    RecordMessage { content: String, is_user: bool },

    /// Perform an action (spawns as background task)
    DispatchAction {
        request_id: u64,
        request: ActionRequest,
    },

    /// Ask the free-text gateway for a reply (spawns as background task)
    RequestReply { text: String },

    /// Append a settled transaction to the ledger
    RecordTransaction {
        kind: ActionKind,
        transaction_hash: String,
    },
}

impl Effect {
    pub fn user_message(content: impl Into<String>) -> Self {
        Effect::RecordMessage {
            content: content.into(),
            is_user: true,
        }
    }

    pub fn assistant_message(content: impl Into<String>) -> Self {
        Effect::RecordMessage {
            content: content.into(),
            is_user: false,
        }
    }
}
