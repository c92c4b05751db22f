use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use crate::crypto::Address;
use crate::error::{AppError, Result};

/// Account state needed to build a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountOnNetwork {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub balance: String,
}

/// Body of `POST /query`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContractQuery {
    pub sc_address: String,
    pub func_name: String,
    /// Hex-encoded top-level arguments.
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContractQueryResponse {
    #[serde(default)]
    pub return_data: Vec<Option<String>>,
    #[serde(default)]
    pub return_code: String,
    #[serde(default)]
    pub return_message: String,
}

impl ContractQueryResponse {
    pub fn is_ok(&self) -> bool {
        self.return_code.eq_ignore_ascii_case("ok")
    }

    /// Base64 return values as raw bytes. Null entries are empty values.
    pub fn decoded_return_data(&self) -> Result<Vec<Vec<u8>>> {
        self.return_data
            .iter()
            .map(|item| match item {
                None => Ok(Vec::new()),
                Some(encoded) => BASE64.decode(encoded).map_err(|e| {
                    AppError::ContractQueryFailed(format!("returnData is not base64: {}", e))
                }),
            })
            .collect()
    }
}

/// Read access to the MultiversX network.
#[async_trait]
pub trait NetworkProvider: Send + Sync {
    async fn get_account(&self, address: &Address) -> Result<AccountOnNetwork>;

    async fn query_contract(&self, query: &ContractQuery) -> Result<ContractQueryResponse>;
}

/// The public MultiversX REST API (`api.multiversx.com` and its devnet/testnet twins).
pub struct MultiversxApiClient {
    api_url: String,
    client: reqwest::Client,
}

impl MultiversxApiClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

#[async_trait]
impl NetworkProvider for MultiversxApiClient {
    async fn get_account(&self, address: &Address) -> Result<AccountOnNetwork> {
        let url = format!("{}/accounts/{}", self.api_url, address);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ContractQueryFailed(format!("account lookup failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ApiErrorBody>()
                .await
                .map(|body| body.message)
                .unwrap_or_default();
            return Err(AppError::ContractQueryFailed(format!(
                "account lookup returned {}: {}",
                status, message
            )));
        }

        response
            .json::<AccountOnNetwork>()
            .await
            .map_err(|e| AppError::ContractQueryFailed(format!("invalid account payload: {}", e)))
    }

    async fn query_contract(&self, query: &ContractQuery) -> Result<ContractQueryResponse> {
        let url = format!("{}/query", self.api_url);
        tracing::debug!("POST {} {}({})", url, query.func_name, query.args.join(","));

        let response = self
            .client
            .post(&url)
            .json(query)
            .send()
            .await
            .map_err(|e| AppError::ContractQueryFailed(format!("{}: {}", query.func_name, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ApiErrorBody>()
                .await
                .map(|body| body.message)
                .unwrap_or_default();
            return Err(AppError::ContractQueryFailed(format!(
                "{} returned {}: {}",
                query.func_name, status, message
            )));
        }

        response.json::<ContractQueryResponse>().await.map_err(|e| {
            AppError::ContractQueryFailed(format!("{}: invalid query payload: {}", query.func_name, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_body_uses_api_field_names() {
        let query = ContractQuery {
            sc_address: "erd1contract".to_string(),
            func_name: "isPaymentDue".to_string(),
            args: vec!["07".to_string()],
            caller: None,
            value: None,
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "scAddress": "erd1contract",
                "funcName": "isPaymentDue",
                "args": ["07"]
            })
        );
    }

    #[test]
    fn return_data_is_base64_decoded() {
        let response: ContractQueryResponse = serde_json::from_value(serde_json::json!({
            "returnData": ["AQ==", null, ""],
            "returnCode": "ok",
            "returnMessage": ""
        }))
        .unwrap();
        assert!(response.is_ok());
        assert_eq!(
            response.decoded_return_data().unwrap(),
            vec![vec![1u8], Vec::new(), Vec::new()]
        );
    }

    #[test]
    fn rejects_invalid_base64() {
        let response = ContractQueryResponse {
            return_data: vec![Some("***".to_string())],
            return_code: "ok".to_string(),
            return_message: String::new(),
        };
        assert!(matches!(
            response.decoded_return_data(),
            Err(AppError::ContractQueryFailed(_))
        ));
    }

    #[test]
    fn trims_trailing_slash() {
        let client = MultiversxApiClient::new("https://devnet-api.multiversx.com/");
        assert_eq!(client.api_url(), "https://devnet-api.multiversx.com");
    }
}
