//! Transcript and snapshot types published by a chat session

use crate::gateway::ActionKind;
use crate::state_machine::FlowState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One transcript entry; never changed after it is appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_user: bool,
}

impl Message {
    pub fn new(content: impl Into<String>, is_user: bool) -> Self {
        Self {
            content: content.into(),
            timestamp: Utc::now(),
            is_user,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(content, false)
    }
}

/// A settled transaction in the session ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub kind: ActionKind,
    pub transaction_hash: String,
    pub settled_at: DateTime<Utc>,
}

/// Point-in-time view of a session, published after every event
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub messages: Vec<Message>,
    pub flow: FlowState,
    /// Action kinds with a request in flight
    pub busy: Vec<ActionKind>,
    pub transactions: Vec<TransactionRecord>,
    pub credential_set: bool,
}
