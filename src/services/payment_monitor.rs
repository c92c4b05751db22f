use std::sync::Arc;

use crate::constants::REFRESH_INTERVAL_SECS;
use crate::services::subscriptions::SubscriptionService;

/// Subscription that is ready for `executePayment`.
#[derive(Debug, Clone, PartialEq)]
pub struct DuePayment {
    pub subscription_id: u64,
    pub payer: String,
    pub recipient: String,
    pub amount_egld: String,
}

/// Watches a fixed set of payers and reports subscriptions whose payment is due.
///
/// It only observes. Executing the payment still takes a signed transaction
/// built through `/subscriptions/execute/{id}`.
pub struct PaymentMonitor {
    subscriptions: SubscriptionService,
    payers: Vec<String>,
}

impl PaymentMonitor {
    pub fn new(subscriptions: SubscriptionService, payers: Vec<String>) -> Self {
        Self {
            subscriptions,
            payers,
        }
    }

    /// Start payment monitoring loop
    pub async fn start_monitor(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                for payment in self.check_due_payments().await {
                    tracing::info!(
                        "Payment due: subscription {} ({} EGLD from {} to {})",
                        payment.subscription_id,
                        payment.amount_egld,
                        payment.payer,
                        payment.recipient
                    );
                }

                tokio::time::sleep(tokio::time::Duration::from_secs(REFRESH_INTERVAL_SECS)).await;
            }
        });
    }

    /// One pass over every watched payer. Lookup failures are logged and skipped.
    pub async fn check_due_payments(&self) -> Vec<DuePayment> {
        let mut due = Vec::new();

        for payer in &self.payers {
            let batch = match self.subscriptions.user_subscriptions(payer).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::warn!("Could not list subscriptions for {}: {}", payer, e);
                    continue;
                }
            };
            for warning in &batch.warnings {
                tracing::warn!("{}: {}", payer, warning);
            }

            for subscription in batch.items.into_iter().filter(|s| s.is_active) {
                match self.subscriptions.is_payment_due(subscription.id).await {
                    Ok(true) => {
                        due.push(DuePayment {
                            subscription_id: subscription.id,
                            payer: subscription.payer,
                            recipient: subscription.recipient,
                            amount_egld: subscription.amount_per_payment_egld,
                        });
                    }
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!("isPaymentDue({}) failed: {}", subscription.id, e);
                    }
                }
            }
        }

        due
    }
}
