//! Chat session executor

use super::snapshot::{Message, SessionSnapshot, TransactionRecord};
use super::{SessionCommand, SseEvent};

use crate::gateway::{ActionGateway, ActionKind, ActionRequest};
use crate::llm::{ChatRequest, ChatService};
use crate::state_machine::replies::GREETING;
use crate::state_machine::{
    transition, ChatState, Credential, Effect, Event, FlowState, SessionContext,
    TransitionError,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Conversation controller for one session.
///
/// Owns the transcript, the flow slot and the pending set. All of them are
/// mutated only from [`ChatSession::run`]; gateway and chat calls run as
/// separate tasks and report back through the command channel.
pub struct ChatSession<G, C>
where
    G: ActionGateway + 'static,
    C: ChatService + 'static,
{
    context: SessionContext,
    state: ChatState,
    messages: Vec<Message>,
    transactions: Vec<TransactionRecord>,
    gateway: Arc<G>,
    chat: Arc<C>,
    system_prompt: Arc<str>,
    command_rx: mpsc::Receiver<SessionCommand>,
    command_tx: mpsc::Sender<SessionCommand>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    /// Events held back until the snapshot that includes them is published
    outbox: Vec<SseEvent>,
    shutdown: CancellationToken,
}

impl<G, C> ChatSession<G, C>
where
    G: ActionGateway + 'static,
    C: ChatService + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        context: SessionContext,
        gateway: G,
        chat: C,
        system_prompt: impl Into<Arc<str>>,
        command_rx: mpsc::Receiver<SessionCommand>,
        command_tx: mpsc::Sender<SessionCommand>,
        broadcast_tx: broadcast::Sender<SseEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        let messages = vec![Message::assistant(GREETING)];
        let state = ChatState::default();
        let (snapshot_tx, _) = watch::channel(SessionSnapshot {
            session_id: context.session_id.clone(),
            messages: messages.clone(),
            flow: state.flow.clone(),
            busy: Vec::new(),
            transactions: Vec::new(),
            credential_set: context.credential.is_some(),
        });

        Self {
            context,
            state,
            messages,
            transactions: Vec::new(),
            gateway: Arc::new(gateway),
            chat: Arc::new(chat),
            system_prompt: system_prompt.into(),
            command_rx,
            command_tx,
            broadcast_tx,
            snapshot_tx,
            outbox: Vec::new(),
            shutdown,
        }
    }

    /// Receiver for snapshots; subscribe before calling [`ChatSession::run`]
    pub fn snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting chat session");

        // Process commands one at a time - single writer
        loop {
            tokio::select! {
                biased;

                () = self.shutdown.cancelled() => break,

                Some(command) = self.command_rx.recv() => {
                    self.process_command(command);
                }

                else => break,
            }
        }

        tracing::info!(session_id = %self.context.session_id, "Chat session stopped");
    }

    fn process_command(&mut self, command: SessionCommand) {
        let before = self.visible_state();

        match command {
            SessionCommand::Event(event) => self.process_event(event),
            SessionCommand::SetCredential(credential) => self.set_credential(credential),
        }

        let after = self.visible_state();
        if after != before {
            let (flow, busy, credential_set) = after;
            self.outbox.push(SseEvent::StateChange {
                flow,
                busy,
                credential_set,
            });
        }

        // Snapshot first: a subscriber joining between the two steps sees
        // these events twice rather than not at all
        self.publish_snapshot();
        for event in self.outbox.drain(..) {
            let _ = self.broadcast_tx.send(event);
        }
    }

    fn visible_state(&self) -> (FlowState, Vec<ActionKind>, bool) {
        (
            self.state.flow.clone(),
            self.state.busy_kinds(),
            self.context.credential.is_some(),
        )
    }

    fn set_credential(&mut self, credential: Option<Credential>) {
        tracing::info!(
            session_id = %self.context.session_id,
            credential_set = credential.is_some(),
            "Credential updated"
        );
        self.context.credential = credential;
    }

    fn process_event(&mut self, event: Event) {
        // Pure state transition
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(TransitionError::InvalidTransition(reason)) => {
                // Late or duplicate settlement; nothing for the user to see
                tracing::warn!(session_id = %self.context.session_id, %reason, "Ignoring event");
                return;
            }
            Err(e) => {
                // User-facing, e.g. "Swap is already in progress"
                let message = e.to_string();
                self.record_message(Message::assistant(message.clone()));
                self.outbox.push(SseEvent::Error { message });
                return;
            }
        };

        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }
    }

    /// Execute an effect; I/O is spawned and reports back as an event
    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RecordMessage { content, is_user } => {
                self.record_message(Message::new(content, is_user));
            }

            Effect::DispatchAction {
                request_id,
                request,
            } => self.spawn_action(request_id, request),

            Effect::RequestReply { text } => {
                let Some(credential) = self.context.credential.clone() else {
                    tracing::warn!(
                        session_id = %self.context.session_id,
                        "Reply requested without a credential"
                    );
                    return;
                };
                self.spawn_reply(credential, text);
            }

            Effect::RecordTransaction {
                kind,
                transaction_hash,
            } => {
                let record = TransactionRecord {
                    kind,
                    transaction_hash,
                    settled_at: Utc::now(),
                };
                self.transactions.push(record.clone());
                self.outbox.push(SseEvent::Transaction { record });
            }
        }
    }

    fn spawn_action(&self, request_id: u64, request: ActionRequest) {
        let gateway = self.gateway.clone();
        let command_tx = self.command_tx.clone();
        let session_id = self.context.session_id.clone();
        let kind = request.kind();

        tracing::info!(
            session_id = %session_id,
            request_id,
            action = %kind,
            "Dispatching action (background)"
        );

        // No cancellation: the call runs to completion even if the session closes
        tokio::spawn(async move {
            let outcome = gateway.perform(&request).await;
            let event = Event::ActionSettled {
                request_id,
                kind,
                outcome,
            };
            if command_tx.send(SessionCommand::Event(event)).await.is_err() {
                tracing::debug!(
                    session_id = %session_id,
                    request_id,
                    "Session closed before action settled"
                );
            }
        });
    }

    fn spawn_reply(&self, credential: Credential, text: String) {
        let chat = self.chat.clone();
        let command_tx = self.command_tx.clone();
        let session_id = self.context.session_id.clone();
        let request = ChatRequest::new(self.system_prompt.as_ref(), text);

        tokio::spawn(async move {
            let outcome = chat.reply(credential.expose(), &request).await;
            let event = Event::ReplySettled { outcome };
            if command_tx.send(SessionCommand::Event(event)).await.is_err() {
                tracing::debug!(session_id = %session_id, "Session closed before reply settled");
            }
        });
    }

    fn record_message(&mut self, message: Message) {
        self.messages.push(message.clone());
        self.outbox.push(SseEvent::Message { message });
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.context.session_id.clone(),
            messages: self.messages.clone(),
            flow: self.state.flow.clone(),
            busy: self.state.busy_kinds(),
            transactions: self.transactions.clone(),
            credential_set: self.context.credential.is_some(),
        }
    }

    fn publish_snapshot(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}
