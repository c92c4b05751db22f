use serde::{Deserialize, Serialize};

/// Scheduled payment as returned to the frontend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: u64,
    pub payer: String,
    pub recipient: String,
    pub token_identifier: String,
    pub amount_per_payment: String,
    #[serde(rename = "amountPerPaymentEGLD")]
    pub amount_per_payment_egld: String,
    pub interval_seconds: u64,
    pub next_payment_time: u64,
    pub next_payment_date: String,
    pub created_at: u64,
    pub payments_made: u64,
    /// `None` means unlimited.
    pub total_payments: Option<u64>,
    pub deposited_balance: String,
    #[serde(rename = "depositedBalanceEGLD")]
    pub deposited_balance_egld: String,
    pub is_active: bool,
    pub interval_type: String,
}

/// Contract `IntervalType` tags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IntervalType {
    Daily,
    Weekly,
    Monthly,
}

impl IntervalType {
    pub fn variant_name(self) -> &'static str {
        match self {
            IntervalType::Daily => "Daily",
            IntervalType::Weekly => "Weekly",
            IntervalType::Monthly => "Monthly",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub recipient: String,
    /// Decimal EGLD, e.g. `"1.5"`.
    pub amount_per_payment: String,
    pub initial_deposit: String,
    pub interval_type: IntervalType,
    #[serde(default)]
    pub total_payments: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AmountRequest {
    pub amount: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressQuery {
    pub address: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDueResponse {
    pub is_due: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimeUntilPaymentResponse {
    pub seconds: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Subscription {
        Subscription {
            id: 1,
            payer: "erd1payer".to_string(),
            recipient: "erd1recipient".to_string(),
            token_identifier: "EGLD".to_string(),
            amount_per_payment: "1500000000000000000".to_string(),
            amount_per_payment_egld: "1.5".to_string(),
            interval_seconds: 86_400,
            next_payment_time: 1_700_000_000,
            next_payment_date: "2023-11-14T22:13:20.000Z".to_string(),
            created_at: 1_699_913_600,
            payments_made: 0,
            total_payments: None,
            deposited_balance: "0".to_string(),
            deposited_balance_egld: "0".to_string(),
            is_active: true,
            interval_type: "Daily".to_string(),
        }
    }

    #[test]
    fn serializes_with_frontend_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["amountPerPaymentEGLD"], "1.5");
        assert_eq!(json["depositedBalanceEGLD"], "0");
        assert_eq!(json["nextPaymentDate"], "2023-11-14T22:13:20.000Z");
        assert_eq!(json["tokenIdentifier"], "EGLD");
        assert!(json["totalPayments"].is_null());
    }

    #[test]
    fn create_request_parses_interval_tag() {
        let request: CreateSubscriptionRequest = serde_json::from_value(serde_json::json!({
            "recipient": "erd1abc",
            "amountPerPayment": "1",
            "initialDeposit": "10",
            "intervalType": "Monthly"
        }))
        .unwrap();
        assert_eq!(request.interval_type, IntervalType::Monthly);
        assert_eq!(request.total_payments, None);
    }

    #[test]
    fn unknown_interval_tag_is_rejected() {
        let result: Result<CreateSubscriptionRequest, _> = serde_json::from_value(serde_json::json!({
            "recipient": "erd1abc",
            "amountPerPayment": "1",
            "initialDeposit": "10",
            "intervalType": "Yearly"
        }));
        assert!(result.is_err());
    }
}
