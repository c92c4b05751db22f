// All service modules
pub mod amount;
pub mod contract;
pub mod mapper;
pub mod payment_monitor;
pub mod platform;
pub mod subscriptions;
pub mod tx_builder;

// Re-export for convenience
pub use contract::ContractClient;
pub use payment_monitor::PaymentMonitor;
pub use platform::PlatformService;
pub use subscriptions::SubscriptionService;
pub use tx_builder::{TransactionBuilder, UnsignedTransaction};

use crate::config::Config;
use std::sync::Arc;

/// Start all background services
pub async fn start_background_services(config: Config, contract: Option<Arc<ContractClient>>) {
    if !config.enable_payment_monitor {
        tracing::info!("Payment monitor disabled (set ENABLE_PAYMENT_MONITOR=true to enable)");
        return;
    }
    let Some(contract) = contract else {
        tracing::warn!("Payment monitor enabled but CONTRACT_ADDRESS is not configured; skipping");
        return;
    };
    if config.payment_monitor_addresses.is_empty() {
        tracing::warn!("Payment monitor enabled without PAYMENT_MONITOR_ADDRESSES; skipping");
        return;
    }

    tracing::info!(
        "Starting payment monitor for {} address(es)",
        config.payment_monitor_addresses.len()
    );
    let monitor = Arc::new(PaymentMonitor::new(
        SubscriptionService::new(contract),
        config.payment_monitor_addresses.clone(),
    ));
    monitor.start_monitor().await;
}
