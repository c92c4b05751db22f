use std::sync::Arc;

use crate::abi::{unwrap_bool, unwrap_optional_u64, TypedValue, ValueError};
use crate::crypto::Address;
use crate::error::{AppError, Result};
use crate::models::{MappedBatch, Subscription};
use crate::services::contract::ContractClient;
use crate::services::mapper::{map_subscription, map_subscriptions};

/// Read side of the scheduled-payments contract.
#[derive(Clone)]
pub struct SubscriptionService {
    contract: Arc<ContractClient>,
}

impl SubscriptionService {
    pub fn new(contract: Arc<ContractClient>) -> Self {
        Self { contract }
    }

    pub async fn user_subscriptions(&self, user: &str) -> Result<MappedBatch<Subscription>> {
        let user = Address::from_bech32(user)?;
        let raw = self
            .contract
            .query("getUserSubscriptions", &[TypedValue::Address(user.to_bech32())])
            .await?;
        Ok(map_subscriptions(&raw))
    }

    /// `None` when the contract has no subscription with this id.
    pub async fn subscription(&self, id: u64) -> Result<Option<Subscription>> {
        let raw = self
            .contract
            .query("getSubscription", &[TypedValue::u64(id)])
            .await?;
        match raw.into_option() {
            None => Ok(None),
            Some(record) => Ok(Some(map_subscription(&record)?)),
        }
    }

    pub async fn is_payment_due(&self, id: u64) -> Result<bool> {
        let raw = self
            .contract
            .query("isPaymentDue", &[TypedValue::u64(id)])
            .await?;
        unwrap_bool(Some(&raw)).map_err(malformed("isPaymentDue"))
    }

    /// Seconds until the next payment; `None` when the subscription is unknown or finished.
    pub async fn time_until_next_payment(&self, id: u64) -> Result<Option<u64>> {
        let raw = self
            .contract
            .query("getTimeUntilNextPayment", &[TypedValue::u64(id)])
            .await?;
        unwrap_optional_u64(Some(&raw)).map_err(malformed("getTimeUntilNextPayment"))
    }
}

fn malformed(function: &'static str) -> impl Fn(ValueError) -> AppError {
    move |err| AppError::ContractQueryFailed(format!("{} returned {}", function, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{address, encoded_subscription, scheduled_client, some, MockProvider};

    fn service(provider: MockProvider) -> SubscriptionService {
        SubscriptionService::new(Arc::new(scheduled_client(provider)))
    }

    #[tokio::test]
    async fn lists_user_subscriptions() {
        let mut list = encoded_subscription(1, 1, 86_400, None, true);
        list.extend(encoded_subscription(2, 1, 604_800, Some(3), false));
        let subscriptions = service(MockProvider::new().returning("getUserSubscriptions", vec![list]));

        let batch = subscriptions.user_subscriptions(&address(1)).await.unwrap();
        assert_eq!(batch.items.len(), 2);
        assert!(batch.warnings.is_empty());
        assert_eq!(batch.items[0].interval_type, "Daily");
        assert_eq!(batch.items[0].amount_per_payment_egld, "1.5");
        assert_eq!(batch.items[0].deposited_balance_egld, "10");
        assert_eq!(batch.items[0].payer, address(1));
        assert_eq!(batch.items[1].total_payments, Some(3));
        assert!(!batch.items[1].is_active);
    }

    #[tokio::test]
    async fn empty_list_result() {
        let subscriptions = service(MockProvider::new().returning("getUserSubscriptions", vec![vec![]]));
        let batch = subscriptions.user_subscriptions(&address(1)).await.unwrap();
        assert!(batch.items.is_empty());
    }

    #[tokio::test]
    async fn single_lookup() {
        let subscriptions = service(MockProvider::new().returning(
            "getSubscription",
            vec![some(encoded_subscription(7, 1, 259_200, None, true))],
        ));
        let found = subscriptions.subscription(7).await.unwrap().unwrap();
        assert_eq!(found.id, 7);
        assert_eq!(found.interval_type, "Every 259200 seconds");
        assert_eq!(found.next_payment_date, "2023-11-15T22:13:20.000Z");
    }

    #[tokio::test]
    async fn missing_subscription_is_none() {
        let subscriptions = service(MockProvider::new().returning("getSubscription", vec![vec![]]));
        assert!(subscriptions.subscription(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn payment_due_and_countdown() {
        let subscriptions = service(
            MockProvider::new()
                .returning("isPaymentDue", vec![vec![1]])
                .returning(
                    "getTimeUntilNextPayment",
                    vec![hex::decode("010000000000000e10").unwrap()],
                ),
        );
        assert!(subscriptions.is_payment_due(1).await.unwrap());
        assert_eq!(subscriptions.time_until_next_payment(1).await.unwrap(), Some(3600));
    }

    #[tokio::test]
    async fn query_failures_propagate() {
        let subscriptions = service(MockProvider::new().unreachable("isPaymentDue"));
        assert!(matches!(
            subscriptions.is_payment_due(1).await,
            Err(AppError::ContractQueryFailed(_))
        ));
    }
}
