//! Runtime for executing chat sessions
//!
//! Each open session runs one [`ChatSession`] task. The [`SessionManager`]
//! owns the handles and routes API calls to them.

mod executor;
mod snapshot;

#[cfg(test)]
pub mod testing;

pub use executor::ChatSession;
pub use snapshot::{Message, SessionSnapshot, TransactionRecord};

use crate::gateway::{ActionGateway, ActionKind};
use crate::llm::ChatService;
use crate::state_machine::{Credential, Event, FlowState, SessionContext};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch, RwLock};
use tokio_util::sync::CancellationToken;

/// Type alias for production sessions with boxed gateways
pub type ProductionSession = ChatSession<Arc<dyn ActionGateway>, Arc<dyn ChatService>>;

/// Input accepted by a running session
#[derive(Debug)]
pub enum SessionCommand {
    Event(Event),
    /// Replace the assistant API key; handled outside the flow machine
    SetCredential(Option<Credential>),
}

/// Events sent to SSE clients, serialized with their `type` tag
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SseEvent {
    Init {
        #[serde(rename = "session")]
        snapshot: SessionSnapshot,
    },
    Message {
        message: Message,
    },
    StateChange {
        flow: FlowState,
        busy: Vec<ActionKind>,
        credential_set: bool,
    },
    Transaction {
        #[serde(rename = "transaction")]
        record: TransactionRecord,
    },
    Error {
        message: String,
    },
}

impl SseEvent {
    /// SSE `event:` field; matches the serialized tag
    pub fn name(&self) -> &'static str {
        match self {
            SseEvent::Init { .. } => "init",
            SseEvent::Message { .. } => "message",
            SseEvent::StateChange { .. } => "state_change",
            SseEvent::Transaction { .. } => "transaction",
            SseEvent::Error { .. } => "error",
        }
    }
}

/// Values shared by every session the manager opens
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub swap_network: String,
    pub system_prompt: String,
    /// Seeds each new session's credential
    pub default_credential: Option<Credential>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Session closed: {0}")]
    Closed(String),
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub command_tx: mpsc::Sender<SessionCommand>,
    pub broadcast_tx: broadcast::Sender<SseEvent>,
    pub snapshot_rx: watch::Receiver<SessionSnapshot>,
    shutdown: CancellationToken,
}

impl SessionHandle {
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }
}

/// Manager for all open chat sessions
pub struct SessionManager {
    gateway: Arc<dyn ActionGateway>,
    chat: Arc<dyn ChatService>,
    settings: SessionSettings,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionManager {
    pub fn new(
        gateway: Arc<dyn ActionGateway>,
        chat: Arc<dyn ChatService>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            gateway,
            chat,
            settings,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a new session and start its runtime
    pub async fn open(&self) -> String {
        let session_id = uuid::Uuid::new_v4().to_string();
        let context = SessionContext::new(&session_id, &self.settings.swap_network)
            .with_credential(self.settings.default_credential.clone());

        let (command_tx, command_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let shutdown = CancellationToken::new();

        let session: ProductionSession = ChatSession::new(
            context,
            self.gateway.clone(),
            self.chat.clone(),
            self.settings.system_prompt.as_str(),
            command_rx,
            command_tx.clone(),
            broadcast_tx.clone(),
            shutdown.clone(),
        );
        let snapshot_rx = session.snapshots();

        let id = session_id.clone();
        tokio::spawn(async move {
            session.run().await;
            tracing::info!(session_id = %id, "Chat session runtime finished");
        });

        self.sessions.write().await.insert(
            session_id.clone(),
            SessionHandle {
                command_tx,
                broadcast_tx,
                snapshot_rx,
                shutdown,
            },
        );

        tracing::info!(session_id = %session_id, "Opened session");
        session_id
    }

    pub async fn get(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    async fn send(&self, session_id: &str, command: SessionCommand) -> Result<(), SessionError> {
        let handle = self.get(session_id).await?;
        handle
            .command_tx
            .send(command)
            .await
            .map_err(|_| SessionError::Closed(session_id.to_string()))
    }

    /// Submit text from the input box
    pub async fn submit(&self, session_id: &str, text: &str) -> Result<(), SessionError> {
        self.send(session_id, SessionCommand::Event(Event::submit(text)))
            .await
    }

    /// Press a quick-action control
    pub async fn trigger(&self, session_id: &str, action: ActionKind) -> Result<(), SessionError> {
        self.send(session_id, SessionCommand::Event(Event::trigger(action)))
            .await
    }

    pub async fn set_credential(
        &self,
        session_id: &str,
        credential: Option<Credential>,
    ) -> Result<(), SessionError> {
        self.send(session_id, SessionCommand::SetCredential(credential))
            .await
    }

    pub async fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, SessionError> {
        Ok(self.get(session_id).await?.snapshot())
    }

    /// Subscribe to session updates, with the snapshot taken at subscription time
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<(SessionSnapshot, broadcast::Receiver<SseEvent>), SessionError> {
        let handle = self.get(session_id).await?;
        let rx = handle.broadcast_tx.subscribe();
        Ok((handle.snapshot(), rx))
    }

    /// Stop the session's event loop and forget it
    pub async fn close(&self, session_id: &str) -> Result<(), SessionError> {
        let handle = self
            .sessions
            .write()
            .await
            .remove(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        handle.shutdown.cancel();
        tracing::info!(session_id = %session_id, "Closed session");
        Ok(())
    }

    /// Stop every session
    pub async fn close_all(&self) {
        let mut sessions = self.sessions.write().await;
        for (_, handle) in sessions.drain() {
            handle.shutdown.cancel();
        }
    }
}
