//! Pure state transition function

use super::parse::{parse_amount, parse_buy_details, parse_token_pair};
use super::replies;
use super::state::{
    BuyStep, ChatState, FlowState, PendingAction, QuestflowStep, SessionContext, SwapStep,
};
use super::{Effect, Event};
use crate::gateway::{
    ActionKind, ActionRequest, ActionResult, QuestflowRequest, SwapRequest, TokenAmount,
};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("{0} is already in progress. Please wait for it to finish.")]
    ActionBusy(ActionKind),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &ChatState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::UserSubmit { text } => Ok(handle_submit(state, context, &text)),
        Event::Trigger { action } => handle_trigger(state, action),
        Event::ActionSettled {
            request_id,
            kind,
            outcome,
        } => {
            let Some(pending) = state.find_pending(request_id) else {
                return Err(TransitionError::InvalidTransition(format!(
                    "no pending request {request_id}"
                )));
            };
            if pending.kind != kind {
                return Err(TransitionError::InvalidTransition(format!(
                    "request {request_id} is {}, not {kind}",
                    pending.kind
                )));
            }

            let mut new_state = state.clone();
            new_state.pending.retain(|p| p.request_id != request_id);

            let effects = match outcome {
                Ok(ActionResult::Transaction { transaction_hash }) => vec![
                    Effect::assistant_message(replies::action_succeeded(kind, &transaction_hash)),
                    Effect::RecordTransaction {
                        kind,
                        transaction_hash,
                    },
                ],
                Ok(ActionResult::Text { result_text }) => {
                    vec![Effect::assistant_message(replies::quest_finished(
                        &result_text,
                    ))]
                }
                Err(e) => vec![Effect::assistant_message(replies::action_failed(
                    kind, &e.message,
                ))],
            };
            Ok(TransitionResult::new(new_state).with_effects(effects))
        }
        Event::ReplySettled { outcome } => {
            let content = match outcome {
                Ok(reply) => reply,
                Err(e) => replies::reply_failed(&e.message),
            };
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::assistant_message(content)))
        }
    }
}

// ============================================================================
// Submissions
// ============================================================================

fn handle_submit(state: &ChatState, context: &SessionContext, text: &str) -> TransitionResult {
    if text.trim().is_empty() {
        return TransitionResult::new(state.clone());
    }

    let recorded = TransitionResult::new(state.clone()).with_effect(Effect::user_message(text));

    match &state.flow {
        FlowState::Idle => match context.credential {
            None => recorded.with_effect(Effect::assistant_message(replies::MISSING_CREDENTIAL)),
            Some(_) => recorded.with_effect(Effect::RequestReply {
                text: text.trim().to_string(),
            }),
        },

        FlowState::Swap {
            step: SwapStep::AwaitingTokenPair,
        } => match parse_token_pair(text) {
            Some(pair) => {
                let confirmation = replies::pair_confirmed(&pair);
                let mut next = recorded.new_state;
                next.flow = FlowState::Swap {
                    step: SwapStep::AwaitingAmount { pair },
                };
                TransitionResult::new(next)
                    .with_effects(recorded.effects)
                    .with_effect(Effect::assistant_message(confirmation))
            }
            None => recorded.with_effect(Effect::assistant_message(replies::swap_pair_reprompt())),
        },

        FlowState::Swap {
            step: SwapStep::AwaitingAmount { pair },
        } => {
            let request = ActionRequest::Swap(SwapRequest {
                source_asset: pair.token_in.clone(),
                dest_asset: pair.token_out.clone(),
                amount: parse_amount(text),
                network: context.swap_network.clone(),
            });
            dispatch(recorded, request, replies::processing)
        }

        FlowState::Buy {
            step: BuyStep::AwaitingDetails,
        } => match parse_buy_details(text) {
            Some((token, amount)) => {
                let request = ActionRequest::Buy(TokenAmount { token, amount });
                dispatch(recorded, request, replies::processing)
            }
            None => {
                recorded.with_effect(Effect::assistant_message(replies::buy_details_reprompt()))
            }
        },

        FlowState::Questflow {
            step: QuestflowStep::AwaitingAgentType,
        } => {
            let request = ActionRequest::Questflow(QuestflowRequest {
                agent_type: text.trim().to_string(),
            });
            dispatch(recorded, request, replies::processing)
        }
    }
}

// ============================================================================
// Quick actions
// ============================================================================

fn handle_trigger(
    state: &ChatState,
    action: ActionKind,
) -> Result<TransitionResult, TransitionError> {
    if state.is_busy(action) {
        return Err(TransitionError::ActionBusy(action));
    }

    let mut result = TransitionResult::new(ChatState {
        flow: FlowState::Idle,
        ..state.clone()
    });
    if let Some(abandoned) = state.flow.kind() {
        result = result.with_effect(Effect::assistant_message(replies::flow_abandoned(
            abandoned,
        )));
    }

    // Each kind either collects input or has sample parameters, never both
    match (FlowState::start(action), ActionRequest::canned(action)) {
        (Some(flow), _) => {
            result.new_state.flow = flow;
            Ok(result.with_effect(Effect::assistant_message(replies::flow_prompt(action))))
        }
        (None, Some(request)) => Ok(dispatch(result, request, replies::canned_dispatch)),
        (None, None) => Err(TransitionError::InvalidTransition(format!(
            "{action} has neither a flow nor sample parameters"
        ))),
    }
}

/// Reset the flow, track the request and hand it to the gateway
fn dispatch(
    result: TransitionResult,
    request: ActionRequest,
    announce: fn(&ActionRequest) -> String,
) -> TransitionResult {
    let TransitionResult {
        new_state: mut state,
        effects,
    } = result;

    let request_id = state.next_request_id;
    state.next_request_id += 1;
    state.flow = FlowState::Idle;
    state.pending.push(PendingAction {
        request_id,
        kind: request.kind(),
    });

    let announcement = announce(&request);
    TransitionResult::new(state)
        .with_effects(effects)
        .with_effect(Effect::assistant_message(announcement))
        .with_effect(Effect::DispatchAction {
            request_id,
            request,
        })
}
