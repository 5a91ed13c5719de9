//! Startup configuration read from environment variables

use crate::llm::DEFAULT_ENDPOINT;
use crate::state_machine::Credential;
use crate::wallet::{WalletType, DEMO_ADDRESS};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SIMULATED_DELAY: Duration = Duration::from_millis(2000);
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SWAP_NETWORK: &str = "near";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("{0} is required when NERO_GATEWAY=http")]
    Missing(&'static str),
}

/// Which action backend to use
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayConfig {
    Simulated { delay: Duration },
    Http { base_url: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub gateway: GatewayConfig,
    pub chat_endpoint: String,
    pub chat_model: String,
    pub swap_network: String,
    pub wallet_address: String,
    pub wallet_type: WalletType,
    pub default_credential: Option<Credential>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match var("NERO_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "NERO_PORT",
                expected: "a port number",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let gateway = match var("NERO_GATEWAY").as_deref().map(str::trim) {
            None | Some("simulated") => {
                let delay = match var("NERO_SIMULATED_DELAY_MS") {
                    Some(value) => value
                        .trim()
                        .parse()
                        .map(Duration::from_millis)
                        .map_err(|_| ConfigError::Invalid {
                            var: "NERO_SIMULATED_DELAY_MS",
                            expected: "a number of milliseconds",
                            value,
                        })?,
                    None => DEFAULT_SIMULATED_DELAY,
                };
                GatewayConfig::Simulated { delay }
            }
            Some("http") => GatewayConfig::Http {
                base_url: var("NERO_ACTIONS_URL")
                    .map(|v| v.trim().to_string())
                    .ok_or(ConfigError::Missing("NERO_ACTIONS_URL"))?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "NERO_GATEWAY",
                    expected: "\"simulated\" or \"http\"",
                    value: other.to_string(),
                })
            }
        };

        let wallet_type = match var("NERO_WALLET_TYPE").as_deref().map(str::trim) {
            None | Some("bitte") => WalletType::Bitte,
            Some("metamask") => WalletType::MetaMask,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "NERO_WALLET_TYPE",
                    expected: "\"bitte\" or \"metamask\"",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            port,
            gateway,
            chat_endpoint: var("NERO_CHAT_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            chat_model: var("NERO_CHAT_MODEL")
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            swap_network: var("NERO_SWAP_NETWORK")
                .unwrap_or_else(|| DEFAULT_SWAP_NETWORK.to_string()),
            wallet_address: var("NERO_WALLET_ADDRESS")
                .unwrap_or_else(|| DEMO_ADDRESS.to_string()),
            wallet_type,
            default_credential: var("OPENAI_API_KEY").and_then(Credential::new),
        })
    }
}
