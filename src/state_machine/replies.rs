//! Assistant reply texts

use super::state::TokenPair;
use crate::gateway::{ActionKind, ActionRequest};

pub const GREETING: &str =
    "Hi! I'm your Nero Helper. I can help you manage your portfolio, answer questions, or just chat.";

pub const MISSING_CREDENTIAL: &str =
    "Please set your OpenAI API key in Settings before chatting with me.";

pub const SWAP_PAIR_FORMAT: &str =
    "Enter the token pair as TOKEN_IN/TOKEN_OUT, for example NEAR/USDC.";

pub const BUY_DETAILS_FORMAT: &str =
    "Enter the token and amount separated by a space, for example NEAR 10.";

pub const QUESTFLOW_AGENT_FORMAT: &str = "Enter the agent type to run, for example research.";

/// Instruction shown when an interactive flow starts
pub fn flow_prompt(kind: ActionKind) -> String {
    match kind {
        ActionKind::Swap => format!("Let's swap tokens. {SWAP_PAIR_FORMAT}"),
        ActionKind::Buy => format!("What would you like to buy? {BUY_DETAILS_FORMAT}"),
        ActionKind::Questflow => format!("Let's start a quest. {QUESTFLOW_AGENT_FORMAT}"),
        other => format!("You selected: {other}. Let me help you with that."),
    }
}

pub fn swap_pair_reprompt() -> String {
    format!("I couldn't read that token pair. {SWAP_PAIR_FORMAT}")
}

pub fn buy_details_reprompt() -> String {
    format!("I couldn't read those details. {BUY_DETAILS_FORMAT}")
}

pub fn pair_confirmed(pair: &TokenPair) -> String {
    format!(
        "Swapping {pair}. How much {} would you like to swap?",
        pair.token_in
    )
}

/// Short description of what a request does
pub fn describe(request: &ActionRequest) -> String {
    match request {
        ActionRequest::Swap(req) => format!(
            "swap {} {} for {} on {}",
            req.amount, req.source_asset, req.dest_asset, req.network
        ),
        ActionRequest::Buy(req) => format!("buy {} {}", req.amount, req.token),
        ActionRequest::Sell(req) => format!("sell {} {}", req.amount, req.token),
        ActionRequest::Stake(req) => format!("stake {} {}", req.amount, req.token),
        ActionRequest::Bridge(req) => format!(
            "bridge {} {} to {}",
            req.amount, req.token, req.destination_chain
        ),
        ActionRequest::Send(req) => format!(
            "send {} {} to {}",
            req.amount, req.token, req.destination_address
        ),
        ActionRequest::Questflow(req) => format!("run the {} agent", req.agent_type),
    }
}

pub fn processing(request: &ActionRequest) -> String {
    format!("Processing your request to {}...", describe(request))
}

/// Instruction for actions dispatched with sample parameters
pub fn canned_dispatch(request: &ActionRequest) -> String {
    format!(
        "{} demo with sample parameters: about to {}. Processing...",
        request.kind(),
        describe(request)
    )
}

pub fn action_succeeded(kind: ActionKind, transaction_hash: &str) -> String {
    format!("{kind} completed successfully! Transaction hash: {transaction_hash}")
}

pub fn quest_finished(result_text: &str) -> String {
    format!("Questflow finished: {result_text}")
}

pub fn action_failed(kind: ActionKind, reason: &str) -> String {
    format!("{kind} failed: {reason}")
}

pub fn flow_abandoned(kind: ActionKind) -> String {
    format!("Cancelled the unfinished {kind} request.")
}

pub fn reply_failed(reason: &str) -> String {
    format!("Sorry, I couldn't get a reply: {reason}")
}
