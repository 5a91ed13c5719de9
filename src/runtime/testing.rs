//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::{ChatSession, SessionCommand, SessionSnapshot, SseEvent};
use crate::gateway::{
    random_transaction_hash, ActionGateway, ActionKind, ActionRequest, ActionResult, GatewayError,
};
use crate::llm::{ChatRequest, ChatService, LlmError};
use crate::state_machine::{Credential, Event, SessionContext};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Mock Action Gateway
// ============================================================================

/// Mock gateway that returns queued outcomes, or a fresh hash when none is queued
pub struct MockActionGateway {
    outcomes: Mutex<VecDeque<Result<ActionResult, GatewayError>>>,
    delay: Duration,
    /// Record of all requests made
    pub requests: Mutex<Vec<ActionRequest>>,
}

#[allow(dead_code)]
impl MockActionGateway {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    /// Gateway that holds every call for `delay` before settling
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            delay,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful outcome
    pub fn queue_result(&self, result: ActionResult) {
        self.outcomes.lock().unwrap().push_back(Ok(result));
    }

    /// Queue a failure
    pub fn queue_error(&self, error: GatewayError) {
        self.outcomes.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<ActionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockActionGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionGateway for MockActionGateway {
    async fn perform(&self, request: &ActionRequest) -> Result<ActionResult, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let queued = self.outcomes.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| {
            Ok(match request.kind() {
                ActionKind::Questflow => ActionResult::text("quest complete"),
                _ => ActionResult::transaction(random_transaction_hash()),
            })
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ============================================================================
// Mock Chat Service
// ============================================================================

/// Mock chat service that returns queued replies
pub struct MockChatService {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    model_id: String,
    /// Record of all (credential, request) pairs
    pub requests: Mutex<Vec<(String, ChatRequest)>>,
}

#[allow(dead_code)]
impl MockChatService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<(String, ChatRequest)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatService for MockChatService {
    async fn reply(&self, credential: &str, request: &ChatRequest) -> Result<String, LlmError> {
        self.requests
            .lock()
            .unwrap()
            .push((credential.to_string(), request.clone()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock reply queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Test Session
// ============================================================================

pub const TEST_SYSTEM_PROMPT: &str = "You are Nero, a test assistant.";

/// Helper for building test sessions with minimal boilerplate
pub struct TestSession {
    pub command_tx: mpsc::Sender<SessionCommand>,
    pub broadcast_rx: broadcast::Receiver<SseEvent>,
    pub snapshot_rx: watch::Receiver<SessionSnapshot>,
    pub gateway: Arc<MockActionGateway>,
    pub chat: Arc<MockChatService>,
    pub shutdown: CancellationToken,
    pub handle: tokio::task::JoinHandle<()>,
}

impl TestSession {
    /// Create a test session with instant mocks
    pub fn new() -> TestSessionBuilder {
        TestSessionBuilder::default()
    }
}

#[derive(Default)]
pub struct TestSessionBuilder {
    gateway: Option<MockActionGateway>,
    chat: Option<MockChatService>,
    credential: Option<Credential>,
}

impl TestSessionBuilder {
    pub fn gateway(mut self, gateway: MockActionGateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn chat(mut self, chat: MockChatService) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn credential(mut self, key: &str) -> Self {
        self.credential = Credential::new(key);
        self
    }

    pub fn build(self) -> TestSession {
        let gateway = Arc::new(self.gateway.unwrap_or_default());
        let chat = Arc::new(
            self.chat
                .unwrap_or_else(|| MockChatService::new("test-model")),
        );

        let context = SessionContext::new("test-session", "near").with_credential(self.credential);
        let (command_tx, command_rx) = mpsc::channel(32);
        let (broadcast_tx, broadcast_rx) = broadcast::channel(128);
        let shutdown = CancellationToken::new();

        let session = ChatSession::new(
            context,
            gateway.clone(),
            chat.clone(),
            TEST_SYSTEM_PROMPT,
            command_rx,
            command_tx.clone(),
            broadcast_tx,
            shutdown.clone(),
        );
        let snapshot_rx = session.snapshots();

        let handle = tokio::spawn(async move {
            session.run().await;
        });

        TestSession {
            command_tx,
            broadcast_rx,
            snapshot_rx,
            gateway,
            chat,
            shutdown,
            handle,
        }
    }
}

impl TestSession {
    pub async fn submit(&self, text: &str) {
        self.command_tx
            .send(SessionCommand::Event(Event::submit(text)))
            .await
            .expect("Failed to submit");
    }

    pub async fn trigger(&self, action: ActionKind) {
        self.command_tx
            .send(SessionCommand::Event(Event::trigger(action)))
            .await
            .expect("Failed to trigger");
    }

    pub async fn set_credential(&self, key: &str) {
        self.command_tx
            .send(SessionCommand::SetCredential(Credential::new(key)))
            .await
            .expect("Failed to set credential");
    }

    /// Wait until a published snapshot satisfies `predicate`
    pub async fn wait_for(
        &mut self,
        timeout: Duration,
        predicate: impl Fn(&SessionSnapshot) -> bool,
    ) -> bool {
        let rx = &mut self.snapshot_rx;
        tokio::time::timeout(timeout, async {
            loop {
                if predicate(&rx.borrow_and_update()) {
                    return true;
                }
                if rx.changed().await.is_err() {
                    return false;
                }
            }
        })
        .await
        .unwrap_or(false)
    }

    /// Wait until the transcript holds `count` messages
    pub async fn wait_for_messages(&mut self, count: usize, timeout: Duration) -> bool {
        self.wait_for(timeout, |s| s.messages.len() >= count).await
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn contents(&self) -> Vec<String> {
        self.snapshot()
            .messages
            .into_iter()
            .map(|m| m.content)
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{is_transaction_hash, SwapRequest, TokenAmount};
    use crate::state_machine::replies;
    use crate::state_machine::FlowState;

    const WAIT: Duration = Duration::from_secs(2);

    fn hash_in(content: &str) -> Option<&str> {
        content.split_whitespace().find(|w| w.starts_with("0x"))
    }

    #[tokio::test]
    async fn test_mock_gateway_defaults_to_fresh_hash() {
        let gateway = MockActionGateway::new();
        let request = ActionRequest::canned(ActionKind::Stake).unwrap();
        let result = gateway.perform(&request).await.unwrap();
        assert!(is_transaction_hash(result.transaction_hash().unwrap()));
        assert_eq!(gateway.recorded_requests(), vec![request]);
    }

    #[tokio::test]
    async fn test_mock_chat_service() {
        let chat = MockChatService::new("test-model");
        chat.queue_reply("gm");
        let request = ChatRequest::new("sys", "hi");
        assert_eq!(chat.reply("sk", &request).await.unwrap(), "gm");
        assert!(chat.reply("sk", &request).await.is_err());
        assert_eq!(chat.recorded_requests().len(), 2);
    }

    /// Swap: pair, amount, processing, then a hash
    #[tokio::test]
    async fn test_swap_scenario() {
        let mut session = TestSession::new().build();

        session.trigger(ActionKind::Swap).await;
        session.submit("near/usdc").await;
        session.submit("5").await;

        // greeting, prompt, user pair, confirmation, user amount, processing, result
        assert!(session.wait_for_messages(7, WAIT).await);
        let contents = session.contents();
        assert!(contents[1].contains(replies::SWAP_PAIR_FORMAT));
        assert_eq!(contents[2], "near/usdc");
        assert!(contents[3].contains("NEAR/USDC"));
        assert_eq!(contents[4], "5");
        assert!(contents[5].starts_with("Processing"));
        let hash = hash_in(&contents[6]).expect("result carries a hash");
        assert!(is_transaction_hash(hash), "bad hash {hash}");

        let snapshot = session.snapshot();
        assert_eq!(snapshot.flow, FlowState::Idle);
        assert!(snapshot.busy.is_empty());
        assert_eq!(snapshot.transactions.len(), 1);
        assert_eq!(snapshot.transactions[0].kind, ActionKind::Swap);
        assert_eq!(snapshot.transactions[0].transaction_hash, hash);

        assert_eq!(
            session.gateway.recorded_requests(),
            vec![ActionRequest::Swap(SwapRequest {
                source_asset: "NEAR".to_string(),
                dest_asset: "USDC".to_string(),
                amount: "5".to_string(),
                network: "near".to_string(),
            })]
        );
    }

    /// Malformed pair re-prompts and keeps the step
    #[tokio::test]
    async fn test_swap_malformed_pair_scenario() {
        let mut session = TestSession::new().build();

        session.trigger(ActionKind::Swap).await;
        session.submit("near usdc").await;

        assert!(session.wait_for_messages(4, WAIT).await);
        let contents = session.contents();
        assert_eq!(contents[3], replies::swap_pair_reprompt());
        assert!(matches!(session.snapshot().flow, FlowState::Swap { .. }));
        assert!(session.gateway.recorded_requests().is_empty());
    }

    /// Free text without a key gets the fixed reply and no chat call
    #[tokio::test]
    async fn test_missing_credential_scenario() {
        let mut session = TestSession::new().build();

        session.submit("what's my balance?").await;

        assert!(session.wait_for_messages(3, WAIT).await);
        assert_eq!(session.contents()[2], replies::MISSING_CREDENTIAL);

        // Give a stray spawned call time to show up
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(session.chat.recorded_requests().is_empty());
    }

    /// Buy with details, then a malformed attempt
    #[tokio::test]
    async fn test_buy_scenario() {
        let mut session = TestSession::new().build();

        session.trigger(ActionKind::Buy).await;
        session.submit("NEAR 10").await;
        assert!(session.wait_for_messages(5, WAIT).await);
        assert!(session
            .contents()
            .last()
            .is_some_and(|c| c.contains("Transaction hash: 0x")));
        assert_eq!(
            session.gateway.recorded_requests(),
            vec![ActionRequest::Buy(TokenAmount {
                token: "NEAR".to_string(),
                amount: "10".to_string(),
            })]
        );

        session.trigger(ActionKind::Buy).await;
        session.submit("NEAR").await;
        assert!(session.wait_for_messages(8, WAIT).await);
        assert_eq!(session.contents()[7], replies::buy_details_reprompt());
        assert!(matches!(session.snapshot().flow, FlowState::Buy { .. }));
        assert_eq!(session.gateway.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_free_text_reply() {
        let chat = MockChatService::new("test-model");
        chat.queue_reply("Staking locks tokens for rewards.");

        let mut session = TestSession::new().chat(chat).credential("sk-test").build();
        session.submit("  what is staking? ").await;

        assert!(session.wait_for_messages(3, WAIT).await);
        assert_eq!(session.contents()[2], "Staking locks tokens for rewards.");

        let requests = session.chat.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "sk-test");
        assert_eq!(requests[0].1.system, TEST_SYSTEM_PROMPT);
        assert_eq!(requests[0].1.message, "what is staking?");
    }

    #[tokio::test]
    async fn test_chat_failure_becomes_message() {
        let chat = MockChatService::new("test-model");
        chat.queue_error(LlmError::auth("Authentication failed: invalid key"));

        let mut session = TestSession::new().chat(chat).credential("sk-bad").build();
        session.submit("hi").await;

        assert!(session.wait_for_messages(3, WAIT).await);
        assert!(session.contents()[2].contains("invalid key"));
    }

    #[tokio::test]
    async fn test_credential_can_be_set_later() {
        let chat = MockChatService::new("test-model");
        chat.queue_reply("hello!");

        let mut session = TestSession::new().chat(chat).build();
        assert!(!session.snapshot().credential_set);

        session.set_credential("sk-late").await;
        session.submit("hi").await;

        assert!(session.wait_for_messages(3, WAIT).await);
        assert!(session.snapshot().credential_set);
        assert_eq!(session.contents()[2], "hello!");
    }

    #[tokio::test]
    async fn test_gateway_failure_surfaces_reason() {
        let gateway = MockActionGateway::new();
        gateway.queue_error(GatewayError::upstream("HTTP 503: bridge offline"));

        let mut session = TestSession::new().gateway(gateway).build();
        session.trigger(ActionKind::Bridge).await;

        assert!(session.wait_for_messages(3, WAIT).await);
        let contents = session.contents();
        assert!(contents[2].contains("bridge offline"));
        assert!(session.snapshot().transactions.is_empty());
    }

    #[tokio::test]
    async fn test_same_action_is_busy_while_pending() {
        let gateway = MockActionGateway::with_delay(Duration::from_millis(300));
        let mut session = TestSession::new().gateway(gateway).build();

        session.trigger(ActionKind::Stake).await;
        assert!(
            session
                .wait_for(WAIT, |s| s.busy == vec![ActionKind::Stake])
                .await
        );

        session.trigger(ActionKind::Stake).await;
        assert!(session.wait_for_messages(3, WAIT).await);
        assert_eq!(
            session.contents()[2],
            "Stake is already in progress. Please wait for it to finish."
        );

        assert!(session.wait_for(WAIT, |s| s.busy.is_empty()).await);
        assert_eq!(session.gateway.recorded_requests().len(), 1);
        assert_eq!(session.snapshot().transactions.len(), 1);
    }

    #[tokio::test]
    async fn test_input_accepted_while_action_pending() {
        let gateway = MockActionGateway::with_delay(Duration::from_millis(300));
        let mut session = TestSession::new().gateway(gateway).build();

        session.trigger(ActionKind::Sell).await;
        session.submit("still there?").await;

        // The chat reply lands before the slow sell settles
        assert!(session.wait_for_messages(4, WAIT).await);
        let contents = session.contents();
        assert_eq!(contents[2], "still there?");
        assert_eq!(contents[3], replies::MISSING_CREDENTIAL);

        assert!(session.wait_for_messages(5, WAIT).await);
        assert!(session.contents()[4].starts_with("Sell completed successfully!"));
    }

    #[tokio::test]
    async fn test_questflow_settles_with_text() {
        let gateway = MockActionGateway::new();
        gateway.queue_result(ActionResult::text("3 quests completed"));

        let mut session = TestSession::new().gateway(gateway).build();
        session.trigger(ActionKind::Questflow).await;
        session.submit("research").await;

        assert!(session.wait_for_messages(5, WAIT).await);
        assert_eq!(
            session.contents()[4],
            replies::quest_finished("3 quests completed")
        );
        assert!(session.snapshot().transactions.is_empty());
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let mut session = TestSession::new().build();
        session.trigger(ActionKind::Swap).await;

        let mut saw_message = false;
        let mut saw_state_change = false;
        let _ = tokio::time::timeout(WAIT, async {
            while !(saw_message && saw_state_change) {
                match session.broadcast_rx.recv().await {
                    Ok(SseEvent::Message { .. }) => saw_message = true,
                    Ok(SseEvent::StateChange { flow, .. }) => {
                        saw_state_change = matches!(flow, FlowState::Swap { .. });
                    }
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
        })
        .await;
        assert!(saw_message);
        assert!(saw_state_change);
    }

    #[tokio::test]
    async fn test_broadcast_follows_published_snapshot() {
        let mut session = TestSession::new().build();
        session.submit("gm").await;

        let event = tokio::time::timeout(WAIT, session.broadcast_rx.recv())
            .await
            .expect("no event")
            .expect("channel closed");
        let SseEvent::Message { message } = event else {
            panic!("expected message event, got {event:?}");
        };
        // Whoever sees the event can already read it from the snapshot
        assert_eq!(message.content, "gm");
        assert!(session.contents().contains(&"gm".to_string()));
    }

    #[tokio::test]
    async fn test_credential_change_is_broadcast() {
        let mut session = TestSession::new().build();
        session.set_credential("sk-late").await;

        let event = tokio::time::timeout(WAIT, session.broadcast_rx.recv())
            .await
            .expect("no event")
            .expect("channel closed");
        assert!(matches!(
            event,
            SseEvent::StateChange {
                credential_set: true,
                ..
            }
        ));
        assert!(session.snapshot().credential_set);

        // Setting the same state again is silent
        session.set_credential("sk-other").await;
        session.submit("   ").await;
        session.set_credential("").await;
        let event = tokio::time::timeout(WAIT, session.broadcast_rx.recv())
            .await
            .expect("no event")
            .expect("channel closed");
        assert!(matches!(
            event,
            SseEvent::StateChange {
                credential_set: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_shutdown_stops_session() {
        let session = TestSession::new().build();
        session.shutdown.cancel();
        assert!(tokio::time::timeout(WAIT, session.handle).await.is_ok());
    }
}
