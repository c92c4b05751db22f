// src/api/mod.rs

pub mod extract;
pub mod health;
pub mod platform;
pub mod subscriptions;

use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::ContractClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Scheduled-payments contract; `None` until `CONTRACT_ADDRESS` is configured.
    pub contract: Option<Arc<ContractClient>>,
    pub platform: Option<Arc<ContractClient>>,
}

pub fn require_contract(state: &AppState) -> Result<Arc<ContractClient>> {
    state.contract.clone().ok_or_else(|| {
        AppError::ContractNotInitialized(
            "scheduled payments contract is not configured (set CONTRACT_ADDRESS)".to_string(),
        )
    })
}

pub fn require_platform(state: &AppState) -> Result<Arc<ContractClient>> {
    state.platform.clone().ok_or_else(|| {
        AppError::ContractNotInitialized(
            "platform contract is not configured (set PLATFORM_CONTRACT_ADDRESS)".to_string(),
        )
    })
}
