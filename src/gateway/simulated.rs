//! Local simulation of the action backend

use super::{ActionGateway, ActionRequest, ActionResult, GatewayError};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

const HASH_HEX_LEN: usize = 64;

/// Gateway that waits a fixed delay and fabricates a transaction hash
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ActionGateway for SimulatedGateway {
    async fn perform(&self, request: &ActionRequest) -> Result<ActionResult, GatewayError> {
        request.validate()?;
        tokio::time::sleep(self.delay).await;

        Ok(match request {
            ActionRequest::Questflow(req) => ActionResult::text(format!(
                "The {} agent finished its quest run. Check the Quests tab for new rewards.",
                req.agent_type
            )),
            _ => ActionResult::transaction(random_transaction_hash()),
        })
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

/// `0x` followed by 64 random lowercase hex characters
pub fn random_transaction_hash() -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut rng = rand::thread_rng();
    let digits: String = (0..HASH_HEX_LEN)
        .map(|_| char::from(HEX[rng.gen_range(0..HEX.len())]))
        .collect();
    format!("0x{digits}")
}

/// Whether `hash` looks like a hash produced by this module
#[allow(dead_code)] // Assertion helper for tests
pub fn is_transaction_hash(hash: &str) -> bool {
    hash.strip_prefix("0x").is_some_and(|digits| {
        digits.len() == HASH_HEX_LEN
            && digits
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    })
}
