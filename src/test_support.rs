//! Shared fixtures for unit tests: bundled ABI artifacts and an in-memory network.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::crypto::Address;
use crate::error::{AppError, Result};
use crate::integrations::{AccountOnNetwork, ContractQuery, ContractQueryResponse, NetworkProvider};
use crate::services::contract::ContractClient;

pub const SCHEDULED_PAYMENTS_ABI: &str =
    include_str!("../abi/scheduled-payments-contract.abi.json");
pub const PLATFORM_ABI: &str = include_str!("../abi/subscription-platform.abi.json");

pub const CONTRACT_ADDRESS: &str = "erd1qqqqqqqqqqqqqpgqntu4fdj7eyq0cg4ezxy9hpashdv89e2e5fkqekx4e4";

pub fn address(fill: u8) -> String {
    Address::from_bytes(&[fill; 32])
        .map(|a| a.to_bech32())
        .unwrap_or_default()
}

#[derive(Clone)]
enum Reply {
    Data(Vec<Vec<u8>>),
    Code(String, String),
    Network(String),
}

/// Canned answers keyed by `function` or `function:hexarg,hexarg`.
#[derive(Default)]
pub struct MockProvider {
    nonce: u64,
    offline: bool,
    replies: HashMap<String, Reply>,
    queries: Mutex<Vec<ContractQuery>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Every call fails as if the API were unreachable.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn returning(mut self, function: &str, data: Vec<Vec<u8>>) -> Self {
        self.replies.insert(function.to_string(), Reply::Data(data));
        self
    }

    pub fn returning_for(mut self, function: &str, args: &[&str], data: Vec<Vec<u8>>) -> Self {
        self.replies
            .insert(format!("{}:{}", function, args.join(",")), Reply::Data(data));
        self
    }

    pub fn failing(mut self, function: &str, code: &str, message: &str) -> Self {
        self.replies.insert(
            function.to_string(),
            Reply::Code(code.to_string(), message.to_string()),
        );
        self
    }

    pub fn unreachable(mut self, function: &str) -> Self {
        self.replies.insert(
            function.to_string(),
            Reply::Network(format!("{} timed out", function)),
        );
        self
    }

    pub fn recorded_queries(&self) -> Vec<ContractQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NetworkProvider for MockProvider {
    async fn get_account(&self, address: &Address) -> Result<AccountOnNetwork> {
        if self.offline {
            return Err(AppError::ContractQueryFailed("network unreachable".to_string()));
        }
        Ok(AccountOnNetwork {
            address: address.to_bech32(),
            nonce: self.nonce,
            balance: "0".to_string(),
        })
    }

    async fn query_contract(&self, query: &ContractQuery) -> Result<ContractQueryResponse> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        if self.offline {
            return Err(AppError::ContractQueryFailed("network unreachable".to_string()));
        }

        let keyed = format!("{}:{}", query.func_name, query.args.join(","));
        let reply = self
            .replies
            .get(&keyed)
            .or_else(|| self.replies.get(&query.func_name))
            .cloned()
            .unwrap_or(Reply::Data(Vec::new()));

        match reply {
            Reply::Data(data) => Ok(ContractQueryResponse {
                return_data: data.iter().map(|item| Some(BASE64.encode(item))).collect(),
                return_code: "ok".to_string(),
                return_message: String::new(),
            }),
            Reply::Code(code, message) => Ok(ContractQueryResponse {
                return_data: Vec::new(),
                return_code: code,
                return_message: message,
            }),
            Reply::Network(message) => Err(AppError::ContractQueryFailed(message)),
        }
    }
}

pub fn scheduled_client(provider: MockProvider) -> ContractClient {
    scheduled_client_shared(Arc::new(provider))
}

pub fn scheduled_client_shared(provider: Arc<MockProvider>) -> ContractClient {
    ContractClient::from_abi_json(CONTRACT_ADDRESS, SCHEDULED_PAYMENTS_ABI, provider)
        .expect("scheduled payments fixture")
}

pub fn platform_client(provider: MockProvider) -> ContractClient {
    ContractClient::from_abi_json(CONTRACT_ADDRESS, PLATFORM_ABI, Arc::new(provider))
        .expect("platform fixture")
}

/// Nested encoding of one scheduled-payments `Subscription` record.
pub fn encoded_subscription(
    id: u64,
    payer: u8,
    interval_seconds: u64,
    total_payments: Option<u64>,
    is_active: bool,
) -> Vec<u8> {
    let cap = match total_payments {
        Some(n) => format!("01{:016x}", n),
        None => "00".to_string(),
    };
    let raw = format!(
        "{:016x}{}{}{}{}{:016x}{:016x}{:016x}{:016x}{}{}{}",
        id,
        format!("{:02x}", payer).repeat(32),
        "02".repeat(32),
        "0000000445474c44",
        "0000000814d1120d7b160000",
        interval_seconds,
        1_700_086_400u64,
        1_700_000_000u64,
        2u64,
        cap,
        "000000088ac7230489e80000",
        if is_active { "01" } else { "00" },
    );
    hex::decode(raw).unwrap_or_default()
}

/// Nested encoding of one platform `Service` record.
pub fn encoded_service(id: u64, name: &str, fee_atomic_hex: &str, active: bool) -> Vec<u8> {
    let fee_len = fee_atomic_hex.len() / 2;
    let raw = format!(
        "{:016x}{}{:08x}{}{:08x}{}{}{:08x}{}{:016x}{}",
        id,
        "03".repeat(32),
        name.len(),
        hex::encode(name),
        4,
        hex::encode("Plan"),
        "0000000445474c44",
        fee_len,
        fee_atomic_hex,
        600u64,
        if active { "01" } else { "00" },
    );
    hex::decode(raw).unwrap_or_default()
}

/// Nested encoding of one platform `Subscription` record.
pub fn encoded_vendor_subscription(id: u64, service_id: u64, status: u8) -> Vec<u8> {
    let raw = format!(
        "{:016x}{:016x}{}{}{}{:016x}{}{:016x}{:016x}{:02x}{:016x}",
        id,
        service_id,
        "04".repeat(32),
        "03".repeat(32),
        "000000080de0b6b3a7640000",
        600u64,
        "000000081bc16d674ec80000",
        1_000u64,
        1_600u64,
        status,
        0u64,
    );
    hex::decode(raw).unwrap_or_default()
}

/// Wraps a nested record as a present top-level `Option`.
pub fn some(record: Vec<u8>) -> Vec<u8> {
    let mut out = vec![1u8];
    out.extend(record);
    out
}
