//! Conversation state types

use crate::gateway::ActionKind;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Flow steps
// ============================================================================

/// Token pair collected by the first swap step, upper-cased
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub token_in: String,
    pub token_out: String,
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token_in, self.token_out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum SwapStep {
    AwaitingTokenPair,
    AwaitingAmount { pair: TokenPair },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum BuyStep {
    AwaitingDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum QuestflowStep {
    AwaitingAgentType,
}

/// The single active multi-step flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum FlowState {
    /// No flow active; input goes to free-text chat
    #[default]
    Idle,

    Swap { step: SwapStep },

    Buy { step: BuyStep },

    Questflow { step: QuestflowStep },
}

impl FlowState {
    /// First step of the flow for `kind`, if the action collects input
    pub fn start(kind: ActionKind) -> Option<Self> {
        match kind {
            ActionKind::Swap => Some(FlowState::Swap {
                step: SwapStep::AwaitingTokenPair,
            }),
            ActionKind::Buy => Some(FlowState::Buy {
                step: BuyStep::AwaitingDetails,
            }),
            ActionKind::Questflow => Some(FlowState::Questflow {
                step: QuestflowStep::AwaitingAgentType,
            }),
            ActionKind::Sell | ActionKind::Bridge | ActionKind::Send | ActionKind::Stake => None,
        }
    }

    /// Action the active flow collects input for
    pub fn kind(&self) -> Option<ActionKind> {
        match self {
            FlowState::Idle => None,
            FlowState::Swap { .. } => Some(ActionKind::Swap),
            FlowState::Buy { .. } => Some(ActionKind::Buy),
            FlowState::Questflow { .. } => Some(ActionKind::Questflow),
        }
    }
}

// ============================================================================
// Chat state
// ============================================================================

/// A dispatched action that has not settled yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub request_id: u64,
    pub kind: ActionKind,
}

/// Everything the transition function reads and rewrites
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatState {
    pub flow: FlowState,
    pub pending: Vec<PendingAction>,
    pub next_request_id: u64,
}

impl ChatState {
    pub fn is_busy(&self, kind: ActionKind) -> bool {
        self.pending.iter().any(|p| p.kind == kind)
    }

    /// Distinct action kinds with a request in flight, in control order
    pub fn busy_kinds(&self) -> Vec<ActionKind> {
        ActionKind::ALL
            .into_iter()
            .filter(|kind| self.is_busy(*kind))
            .collect()
    }

    pub fn find_pending(&self, request_id: u64) -> Option<&PendingAction> {
        self.pending.iter().find(|p| p.request_id == request_id)
    }
}

// ============================================================================
// Context
// ============================================================================

/// Assistant API key; never printed
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Blank keys count as no key
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key.trim().to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Per-session values the transition function reads but never changes
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    /// Network sent with every swap request
    pub swap_network: String,
    pub credential: Option<Credential>,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>, swap_network: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            swap_network: swap_network.into(),
            credential: None,
        }
    }

    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }
}
