//! Action request and result types

use super::GatewayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quick actions the assistant can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Buy,
    Sell,
    Swap,
    Bridge,
    Send,
    Stake,
    Questflow,
}

impl ActionKind {
    /// Quick-action controls, in display order
    pub const ALL: [ActionKind; 7] = [
        ActionKind::Buy,
        ActionKind::Sell,
        ActionKind::Swap,
        ActionKind::Bridge,
        ActionKind::Send,
        ActionKind::Stake,
        ActionKind::Questflow,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Buy => "Buy",
            ActionKind::Sell => "Sell",
            ActionKind::Swap => "Swap",
            ActionKind::Bridge => "Bridge",
            ActionKind::Send => "Send",
            ActionKind::Stake => "Stake",
            ActionKind::Questflow => "Questflow",
        }
    }

    /// Backend route segment for the action
    pub fn route(self) -> &'static str {
        match self {
            ActionKind::Buy => "buy",
            ActionKind::Sell => "sell",
            ActionKind::Swap => "swap",
            ActionKind::Bridge => "bridge",
            ActionKind::Send => "send",
            ActionKind::Stake => "stake",
            ActionKind::Questflow => "questflow",
        }
    }

    /// Whether triggering the action starts a multi-step flow.
    ///
    /// The others dispatch immediately with canned parameters.
    pub fn collects_input(self) -> bool {
        matches!(
            self,
            ActionKind::Swap | ActionKind::Buy | ActionKind::Questflow
        )
    }

    /// Whether the action settles with a transaction hash
    pub fn produces_transaction(self) -> bool {
        !matches!(self, ActionKind::Questflow)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for ActionKind {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub source_asset: String,
    pub dest_asset: String,
    pub amount: String,
    pub network: String,
}

/// Body shared by buy, sell and stake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    pub token: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest {
    pub token: String,
    pub amount: String,
    pub destination_chain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub token: String,
    pub amount: String,
    pub destination_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestflowRequest {
    pub agent_type: String,
}

/// A fully-specified request for the action gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRequest {
    Swap(SwapRequest),
    Buy(TokenAmount),
    Sell(TokenAmount),
    Bridge(BridgeRequest),
    Send(SendRequest),
    Stake(TokenAmount),
    Questflow(QuestflowRequest),
}

impl ActionRequest {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionRequest::Swap(_) => ActionKind::Swap,
            ActionRequest::Buy(_) => ActionKind::Buy,
            ActionRequest::Sell(_) => ActionKind::Sell,
            ActionRequest::Bridge(_) => ActionKind::Bridge,
            ActionRequest::Send(_) => ActionKind::Send,
            ActionRequest::Stake(_) => ActionKind::Stake,
            ActionRequest::Questflow(_) => ActionKind::Questflow,
        }
    }

    /// Canned parameters for actions that are demonstrated rather than collected.
    ///
    /// Returns `None` for actions that gather their parameters interactively.
    pub fn canned(kind: ActionKind) -> Option<Self> {
        let token_amount = |token: &str, amount: &str| TokenAmount {
            token: token.to_string(),
            amount: amount.to_string(),
        };
        match kind {
            ActionKind::Sell => Some(ActionRequest::Sell(token_amount("NEAR", "10"))),
            ActionKind::Bridge => Some(ActionRequest::Bridge(BridgeRequest {
                token: "USDC".to_string(),
                amount: "25".to_string(),
                destination_chain: "ethereum".to_string(),
            })),
            ActionKind::Send => Some(ActionRequest::Send(SendRequest {
                token: "NEAR".to_string(),
                amount: "1".to_string(),
                destination_address: "receiver.near".to_string(),
            })),
            ActionKind::Stake => Some(ActionRequest::Stake(token_amount("NEAR", "100"))),
            ActionKind::Swap | ActionKind::Buy | ActionKind::Questflow => None,
        }
    }

    /// JSON body sent to the per-action backend route
    pub fn body(&self) -> serde_json::Value {
        let body = match self {
            ActionRequest::Swap(req) => serde_json::to_value(req),
            ActionRequest::Buy(req) | ActionRequest::Sell(req) | ActionRequest::Stake(req) => {
                serde_json::to_value(req)
            }
            ActionRequest::Bridge(req) => serde_json::to_value(req),
            ActionRequest::Send(req) => serde_json::to_value(req),
            ActionRequest::Questflow(req) => serde_json::to_value(req),
        };
        body.unwrap_or(serde_json::Value::Null)
    }

    /// Reject requests with missing required fields
    pub fn validate(&self) -> Result<(), GatewayError> {
        let required: Vec<(&str, &str)> = match self {
            ActionRequest::Swap(req) => vec![
                ("sourceAsset", req.source_asset.as_str()),
                ("destAsset", req.dest_asset.as_str()),
                ("amount", req.amount.as_str()),
                ("network", req.network.as_str()),
            ],
            ActionRequest::Buy(req) | ActionRequest::Sell(req) | ActionRequest::Stake(req) => {
                vec![("token", req.token.as_str()), ("amount", req.amount.as_str())]
            }
            ActionRequest::Bridge(req) => vec![
                ("token", req.token.as_str()),
                ("amount", req.amount.as_str()),
                ("destinationChain", req.destination_chain.as_str()),
            ],
            ActionRequest::Send(req) => vec![
                ("token", req.token.as_str()),
                ("amount", req.amount.as_str()),
                ("destinationAddress", req.destination_address.as_str()),
            ],
            ActionRequest::Questflow(req) => vec![("agentType", req.agent_type.as_str())],
        };

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(GatewayError::validation(format!(
                "{} request is missing {field}",
                self.kind()
            ))),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// Outcome of a successful action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionResult {
    Transaction {
        #[serde(rename = "transactionHash")]
        transaction_hash: String,
    },
    Text {
        #[serde(rename = "resultText")]
        result_text: String,
    },
}

impl ActionResult {
    pub fn transaction(hash: impl Into<String>) -> Self {
        ActionResult::Transaction {
            transaction_hash: hash.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        ActionResult::Text {
            result_text: text.into(),
        }
    }

    pub fn transaction_hash(&self) -> Option<&str> {
        match self {
            ActionResult::Transaction { transaction_hash } => Some(transaction_hash),
            ActionResult::Text { .. } => None,
        }
    }
}
