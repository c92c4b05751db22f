use std::sync::Arc;

use crate::abi::{unwrap_id_list, unwrap_u8, TypedValue};
use crate::crypto::Address;
use crate::error::{AppError, Result};
use crate::models::{MappedBatch, Service, VendorSubscription};
use crate::services::contract::ContractClient;
use crate::services::mapper::{map_service, map_vendor_subscription};

/// Read side of the subscription platform contract (providers, services, vendor subscriptions).
#[derive(Clone)]
pub struct PlatformService {
    contract: Arc<ContractClient>,
}

impl PlatformService {
    pub fn new(contract: Arc<ContractClient>) -> Self {
        Self { contract }
    }

    pub async fn user_role(&self, address: &str) -> Result<u8> {
        let address = Address::from_bech32(address)?;
        let raw = self
            .contract
            .query("getUserRole", &[TypedValue::Address(address.to_bech32())])
            .await?;
        unwrap_u8(Some(&raw))
            .map_err(|e| AppError::ContractQueryFailed(format!("getUserRole returned {}", e)))
    }

    pub async fn services(&self) -> Result<MappedBatch<Service>> {
        let ids = self.ids("getAllServiceIds", &[]).await?;
        let mut batch = MappedBatch::default();

        for id in ids {
            match self.contract.query("getService", &[TypedValue::u64(id)]).await {
                Ok(raw) => match raw.into_option() {
                    Some(record) => match map_service(&record, id) {
                        Ok(service) => batch.push(service),
                        Err(err) => {
                            tracing::warn!("Failed to decode service {}: {}", id, err);
                            batch.warn(format!("Failed to decode service {}: {}", id, err));
                        }
                    },
                    None => batch.warn(format!("Service {} not found", id)),
                },
                Err(err) => {
                    tracing::warn!("Failed to load service {}: {}", id, err);
                    batch.warn(format!("Failed to load service {}: {}", id, err));
                }
            }
        }
        Ok(batch)
    }

    pub async fn user_subscriptions(&self, user: &str) -> Result<MappedBatch<VendorSubscription>> {
        self.subscriptions_by("getUserSubscriptions", user).await
    }

    pub async fn provider_subscriptions(
        &self,
        provider: &str,
    ) -> Result<MappedBatch<VendorSubscription>> {
        self.subscriptions_by("getProviderSubscriptions", provider).await
    }

    async fn subscriptions_by(
        &self,
        function: &str,
        owner: &str,
    ) -> Result<MappedBatch<VendorSubscription>> {
        let owner = Address::from_bech32(owner)?;
        let ids = self
            .ids(function, &[TypedValue::Address(owner.to_bech32())])
            .await?;
        let mut batch = MappedBatch::default();

        for id in ids {
            match self.contract.query("getSubscription", &[TypedValue::u64(id)]).await {
                Ok(raw) => match raw.into_option() {
                    Some(record) => match map_vendor_subscription(&record, id) {
                        Ok(subscription) => batch.push(subscription),
                        Err(err) => {
                            tracing::warn!("Failed to decode subscription {}: {}", id, err);
                            batch.warn(format!("Failed to decode subscription {}: {}", id, err));
                        }
                    },
                    None => batch.warn(format!("Subscription {} not found", id)),
                },
                Err(err) => {
                    tracing::warn!("Failed to load subscription {}: {}", id, err);
                    batch.warn(format!("Failed to load subscription {}: {}", id, err));
                }
            }
        }
        Ok(batch)
    }

    async fn ids(&self, function: &str, args: &[TypedValue]) -> Result<Vec<u64>> {
        let raw = self.contract.query(function, args).await?;
        unwrap_id_list(&raw)
            .map_err(|e| AppError::ContractQueryFailed(format!("{} returned {}", function, e)))
    }
}
