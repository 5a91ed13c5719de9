//! API request and response types

use crate::gateway::ActionKind;
use crate::runtime::TransactionRecord;
use serde::{Deserialize, Serialize};

/// Response for a newly opened session
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// Request to submit text from the input box
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Request to set or clear the assistant API key
#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Response for queued user input
#[derive(Debug, Serialize)]
pub struct QueuedResponse {
    pub queued: bool,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Response for credential updates; the key itself is never echoed
#[derive(Debug, Serialize)]
pub struct CredentialResponse {
    pub credential_set: bool,
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<TransactionRecord>,
}

/// One quick-action control
#[derive(Debug, Serialize)]
pub struct ActionInfo {
    pub action: ActionKind,
    pub label: &'static str,
    pub collects_input: bool,
}

#[derive(Debug, Serialize)]
pub struct ActionsResponse {
    pub actions: Vec<ActionInfo>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
