use serde::{Deserialize, Serialize};

use crate::constants::{ROLE_PROVIDER, ROLE_USER};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: u64,
    pub provider: String,
    pub name: String,
    pub description: String,
    pub token: String,
    pub amount_per_cycle: String,
    #[serde(rename = "amountPerCycleEGLD")]
    pub amount_per_cycle_egld: String,
    pub frequency_in_blocks: u64,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VendorSubscription {
    pub id: u64,
    pub service_id: u64,
    pub client: String,
    pub vendor: String,
    pub amount_per_cycle: String,
    #[serde(rename = "amountPerCycleEGLD")]
    pub amount_per_cycle_egld: String,
    pub frequency_in_blocks: u64,
    pub remaining_balance: String,
    #[serde(rename = "remainingBalanceEGLD")]
    pub remaining_balance_egld: String,
    pub last_payment_block: u64,
    pub next_payment_block: u64,
    pub status: u8,
    pub status_label: String,
    pub cancel_effective_block: u64,
}

/// Lifecycle of a platform subscription, as stored by the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
    PendingUserCancel,
    PendingProviderCancel,
    CancelledByUser,
    CancelledByProvider,
    CancelledInsufficientFunds,
    Unknown(u8),
}

impl SubscriptionStatus {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => SubscriptionStatus::Active,
            2 => SubscriptionStatus::PendingUserCancel,
            3 => SubscriptionStatus::PendingProviderCancel,
            4 => SubscriptionStatus::CancelledByUser,
            5 => SubscriptionStatus::CancelledByProvider,
            6 => SubscriptionStatus::CancelledInsufficientFunds,
            other => SubscriptionStatus::Unknown(other),
        }
    }

    /// Unknown codes render as the bare number.
    pub fn label(self) -> String {
        match self {
            SubscriptionStatus::Active => "Active".to_string(),
            SubscriptionStatus::PendingUserCancel => "PendingUserCancel".to_string(),
            SubscriptionStatus::PendingProviderCancel => "PendingProviderCancel".to_string(),
            SubscriptionStatus::CancelledByUser => "CancelledByUser".to_string(),
            SubscriptionStatus::CancelledByProvider => "CancelledByProvider".to_string(),
            SubscriptionStatus::CancelledInsufficientFunds => {
                "CancelledInsufficientFunds".to_string()
            }
            SubscriptionStatus::Unknown(code) => code.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoleResponse {
    pub role: u8,
    pub label: String,
}

impl RoleResponse {
    pub fn from_code(role: u8) -> Self {
        let label = match role {
            ROLE_USER => "User",
            ROLE_PROVIDER => "Service Provider",
            _ => "Unregistered",
        };
        Self {
            role,
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlatformRole {
    User,
    Provider,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CancelledBy {
    #[default]
    User,
    Provider,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterQuery {
    pub address: String,
    pub role: PlatformRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelQuery {
    pub address: String,
    #[serde(default)]
    pub by: CancelledBy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Decimal EGLD per billing cycle.
    pub amount_per_cycle: String,
    pub frequency_in_blocks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_status_codes_have_names() {
        assert_eq!(SubscriptionStatus::from_code(1).label(), "Active");
        assert_eq!(
            SubscriptionStatus::from_code(6).label(),
            "CancelledInsufficientFunds"
        );
    }

    #[test]
    fn unknown_status_code_is_kept_raw() {
        let status = SubscriptionStatus::from_code(42);
        assert_eq!(status, SubscriptionStatus::Unknown(42));
        assert_eq!(status.label(), "42");
        assert_eq!(SubscriptionStatus::from_code(0).label(), "0");
    }

    #[test]
    fn role_labels() {
        assert_eq!(RoleResponse::from_code(1).label, "User");
        assert_eq!(RoleResponse::from_code(2).label, "Service Provider");
        assert_eq!(RoleResponse::from_code(0).label, "Unregistered");
        assert_eq!(RoleResponse::from_code(9).label, "Unregistered");
    }

    #[test]
    fn cancel_query_defaults_to_user() {
        let query: CancelQuery =
            serde_json::from_value(serde_json::json!({ "address": "erd1abc" })).unwrap();
        assert_eq!(query.by, CancelledBy::User);
    }
}
