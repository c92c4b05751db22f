use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::constants::SERVICE_NAME;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
    pub version: String,
    pub network: String,
    pub contract: String,
    pub platform_contract: String,
}

fn contract_status(configured: bool) -> String {
    if configured {
        "initialized".to_string()
    } else {
        "not_configured".to_string()
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        network: state.config.network.clone(),
        contract: contract_status(state.contract.is_some()),
        platform_contract: contract_status(state.platform.is_some()),
    })
}
