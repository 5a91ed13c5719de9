//! Networked action backend

use super::{ActionGateway, ActionKind, ActionRequest, ActionResult, GatewayError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Gateway that POSTs each action to `{base_url}/{route}`
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionResponse {
    transaction_hash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextResponse {
    result_text: String,
}

#[derive(Debug, Deserialize)]
struct BackendErrorResponse {
    error: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, kind: ActionKind) -> String {
        format!("{}/{}", self.base_url, kind.route())
    }

    fn parse_success(kind: ActionKind, body: &str) -> Result<ActionResult, GatewayError> {
        let decode_err = |e: serde_json::Error| {
            GatewayError::decode(format!("Failed to parse {kind} response: {e} - body: {body}"))
        };

        if kind.produces_transaction() {
            let resp: TransactionResponse = serde_json::from_str(body).map_err(decode_err)?;
            Ok(ActionResult::transaction(resp.transaction_hash))
        } else {
            let resp: TextResponse = serde_json::from_str(body).map_err(decode_err)?;
            Ok(ActionResult::text(resp.result_text))
        }
    }

    fn classify_failure(status: reqwest::StatusCode, body: &str) -> GatewayError {
        let message = serde_json::from_str::<BackendErrorResponse>(body)
            .map_or_else(|_| body.to_string(), |resp| resp.error);
        GatewayError::upstream(format!("HTTP {status}: {message}"))
    }
}

#[async_trait]
impl ActionGateway for HttpGateway {
    async fn perform(&self, request: &ActionRequest) -> Result<ActionResult, GatewayError> {
        request.validate()?;

        let kind = request.kind();
        let response = self
            .client
            .post(self.endpoint(kind))
            .json(&request.body())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    GatewayError::network(format!("Connection failed: {e}"))
                } else {
                    GatewayError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::classify_failure(status, &body));
        }

        Self::parse_success(kind, &body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
