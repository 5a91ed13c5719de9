//! Wallet connection manager
//!
//! Constructed once at startup and shared by reference with whoever needs it.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Address used when none is configured
pub const DEMO_ADDRESS: &str = "0Bhv9X0d4c2a7e19f35b8c6d0e1f2a3b4c5d65Xc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletType {
    Bitte,
    MetaMask,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub address: String,
    #[serde(rename = "type")]
    pub wallet_type: WalletType,
    pub short_address: String,
}

/// Connection state as reported to the dashboard header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletStatus {
    pub connected: bool,
    pub info: Option<WalletInfo>,
}

/// `first 7 ... last 4` for long addresses; short ones are returned unchanged
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 14 {
        return address.to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

pub struct WalletManager {
    address: String,
    wallet_type: WalletType,
    info: RwLock<Option<WalletInfo>>,
}

impl WalletManager {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            wallet_type: WalletType::Bitte,
            info: RwLock::new(None),
        }
    }

    pub fn with_type(mut self, wallet_type: WalletType) -> Self {
        self.wallet_type = wallet_type;
        self
    }

    /// Connect (simulated) and return the wallet details
    pub async fn connect(&self) -> WalletInfo {
        let info = WalletInfo {
            address: self.address.clone(),
            wallet_type: self.wallet_type,
            short_address: short_address(&self.address),
        };
        *self.info.write().await = Some(info.clone());
        tracing::info!(address = %info.short_address, "Wallet connected");
        info
    }

    pub async fn disconnect(&self) {
        if self.info.write().await.take().is_some() {
            tracing::info!("Wallet disconnected");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.info.read().await.is_some()
    }

    pub async fn info(&self) -> Option<WalletInfo> {
        self.info.read().await.clone()
    }

    pub async fn status(&self) -> WalletStatus {
        let info = self.info().await;
        WalletStatus {
            connected: info.is_some(),
            info,
        }
    }

    /// Header button behavior: connect when disconnected, otherwise disconnect
    pub async fn toggle(&self) -> WalletStatus {
        if self.is_connected().await {
            self.disconnect().await;
        } else {
            self.connect().await;
        }
        self.status().await
    }
}
