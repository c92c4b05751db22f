pub mod platform;
pub mod subscription;

pub use platform::{
    CancelQuery, CancelledBy, CreateServiceRequest, PlatformRole, RegisterQuery, RoleResponse,
    Service, SubscriptionStatus, VendorSubscription,
};
pub use subscription::{
    AddressQuery, AmountRequest, CreateSubscriptionRequest, IntervalType, PaymentDueResponse,
    Subscription, TimeUntilPaymentResponse,
};

use serde::Serialize;

/// Result of mapping a collection: good records plus one warning per skipped record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MappedBatch<T> {
    pub items: Vec<T>,
    pub warnings: Vec<String>,
}

impl<T> Default for MappedBatch<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl<T> MappedBatch<T> {
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}
