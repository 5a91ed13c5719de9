//! HTTP API for the Nero assistant

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::runtime::SessionManager;
use crate::wallet::WalletManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub wallet: Arc<WalletManager>,
}

impl AppState {
    pub fn new(sessions: SessionManager, wallet: WalletManager) -> Self {
        Self {
            sessions: Arc::new(sessions),
            wallet: Arc::new(wallet),
        }
    }
}
