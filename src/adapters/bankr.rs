//! Bankr adapter for the token deployer port.
//!
//! Deployments carry a fixed fee-recipient wallet from configuration; the
//! oracle never chooses where fees go. Balance reporting is best-effort:
//! when the backend cannot report one, the executor's balance guardrail
//! passes.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::info;

use crate::config::TokenDeployConfig;
use crate::ports::{DeployError, TokenDeployer, TokenDeployment, TokenSpec};

pub struct BankrDeployer {
    client: reqwest::Client,
    config: TokenDeployConfig,
}

impl BankrDeployer {
    pub fn new(config: TokenDeployConfig) -> Result<Self, DeployError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| DeployError::network(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn deploy_body(&self, spec: &TokenSpec) -> serde_json::Value {
        serde_json::json!({
            "tokenName": spec.name,
            "tokenSymbol": spec.symbol,
            "description": spec.description,
            "feeRecipient": {
                "type": "wallet",
                "value": self.config.reward_address,
            },
        })
    }
}

#[async_trait]
impl TokenDeployer for BankrDeployer {
    async fn deploy(&self, spec: &TokenSpec) -> Result<TokenDeployment, DeployError> {
        let response = self
            .client
            .post(format!("{}/v1/tokens", self.config.base_url))
            .header("x-api-key", self.config.api_key.expose_secret())
            .json(&self.deploy_body(spec))
            .send()
            .await
            .map_err(|e| DeployError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DeployError::Failed(format!("{status}: {message}")));
        }

        let parsed: DeployResponse = response
            .json()
            .await
            .map_err(|e| DeployError::parse(e.to_string()))?;
        if !parsed.success {
            return Err(DeployError::Failed(
                parsed.error.unwrap_or_else(|| "deployment not confirmed".into()),
            ));
        }
        let (Some(transaction), Some(contract)) = (parsed.tx_hash, parsed.token_address) else {
            return Err(DeployError::parse("response missing tx hash or address"));
        };

        info!(symbol = %spec.symbol, contract = %contract, "token deployed");
        Ok(TokenDeployment {
            transaction,
            contract,
        })
    }

    async fn balance(&self) -> Result<Option<u128>, DeployError> {
        let response = self
            .client
            .get(format!("{}/v1/wallet", self.config.base_url))
            .header("x-api-key", self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| DeployError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(DeployError::Failed(format!("{status}: {message}")));
        }

        let parsed: WalletResponse = response
            .json()
            .await
            .map_err(|e| DeployError::parse(e.to_string()))?;
        Ok(parsed.balance.and_then(|b| b.parse().ok()))
    }
}

#[derive(Deserialize)]
struct DeployResponse {
    #[serde(default)]
    success: bool,
    #[serde(rename = "txHash")]
    tx_hash: Option<String>,
    #[serde(rename = "tokenAddress")]
    token_address: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct WalletResponse {
    /// Balance in wei as a decimal string.
    #[serde(default)]
    balance: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployer() -> BankrDeployer {
        BankrDeployer::new(
            TokenDeployConfig::new("key", "0xabc").with_base_url("http://localhost:1"),
        )
        .unwrap()
    }

    #[test]
    fn deploy_body_pins_the_fee_recipient() {
        let body = deployer().deploy_body(&TokenSpec {
            name: "Sentinel".into(),
            symbol: "SNT".into(),
            description: Some("autonomy".into()),
        });
        assert_eq!(body["tokenName"], "Sentinel");
        assert_eq!(body["tokenSymbol"], "SNT");
        assert_eq!(body["feeRecipient"]["type"], "wallet");
        assert_eq!(body["feeRecipient"]["value"], "0xabc");
    }

    #[test]
    fn deploy_response_parses_confirmation() {
        let raw = r#"{"success": true, "txHash": "0x1", "tokenAddress": "0x2"}"#;
        let parsed: DeployResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.tx_hash.as_deref(), Some("0x1"));
        assert_eq!(parsed.token_address.as_deref(), Some("0x2"));
    }

    #[test]
    fn wallet_balance_is_a_decimal_string() {
        let parsed: WalletResponse =
            serde_json::from_str(r#"{"balance": "1000000000000000000"}"#).unwrap();
        assert_eq!(
            parsed.balance.and_then(|b| b.parse::<u128>().ok()),
            Some(1_000_000_000_000_000_000)
        );
    }
}
