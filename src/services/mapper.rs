//! Contract records to frontend view models.
//!
//! Absent fields fall back to neutral defaults. A field that is present with the
//! wrong shape makes the whole record malformed; collections skip such records
//! and carry a warning instead.

use chrono::{DateTime, SecondsFormat};
use thiserror::Error;

use crate::abi::{
    unwrap_address, unwrap_biguint, unwrap_bool, unwrap_optional_u64, unwrap_text, unwrap_u64,
    unwrap_u8, TypedValue, ValueError,
};
use crate::constants::{
    DEFAULT_TOKEN_IDENTIFIER, EGLD_DECIMALS, SECONDS_PER_DAY, SECONDS_PER_MONTH, SECONDS_PER_WEEK,
};
use crate::error::AppError;
use crate::models::{MappedBatch, Service, Subscription, SubscriptionStatus, VendorSubscription};
use crate::services::amount::format_atomic;

#[derive(Debug, Error, PartialEq)]
#[error("field '{field}': {reason}")]
pub struct MappingError {
    pub field: &'static str,
    pub reason: String,
}

impl From<MappingError> for AppError {
    fn from(err: MappingError) -> Self {
        AppError::ContractQueryFailed(format!("malformed record, {}", err))
    }
}

fn at(field: &'static str) -> impl Fn(ValueError) -> MappingError {
    move |err| MappingError {
        field,
        reason: err.to_string(),
    }
}

pub fn interval_label(seconds: u64) -> String {
    match seconds {
        SECONDS_PER_DAY => "Daily".to_string(),
        SECONDS_PER_WEEK => "Weekly".to_string(),
        SECONDS_PER_MONTH => "Monthly".to_string(),
        other => format!("Every {} seconds", other),
    }
}

/// Unix seconds as ISO-8601 UTC with millisecond precision.
pub fn iso_date(unix_seconds: u64) -> Option<String> {
    let seconds = i64::try_from(unix_seconds).ok()?;
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn map_subscription(raw: &TypedValue) -> Result<Subscription, MappingError> {
    let amount = unwrap_biguint(raw.field("amount_per_payment")).map_err(at("amount_per_payment"))?;
    let balance = unwrap_biguint(raw.field("deposited_balance")).map_err(at("deposited_balance"))?;
    let interval_seconds = unwrap_u64(raw.field("interval_seconds")).map_err(at("interval_seconds"))?;
    let next_payment_time =
        unwrap_u64(raw.field("next_payment_time")).map_err(at("next_payment_time"))?;
    let next_payment_date = iso_date(next_payment_time).ok_or_else(|| MappingError {
        field: "next_payment_time",
        reason: format!("{} is not a representable timestamp", next_payment_time),
    })?;

    Ok(Subscription {
        id: unwrap_u64(raw.field("id")).map_err(at("id"))?,
        payer: unwrap_address(raw.field("payer")).map_err(at("payer"))?,
        recipient: unwrap_address(raw.field("recipient")).map_err(at("recipient"))?,
        token_identifier: unwrap_text(raw.field("token_identifier"), DEFAULT_TOKEN_IDENTIFIER)
            .map_err(at("token_identifier"))?,
        amount_per_payment: amount.to_string(),
        amount_per_payment_egld: format_atomic(&amount, EGLD_DECIMALS),
        interval_seconds,
        next_payment_time,
        next_payment_date,
        created_at: unwrap_u64(raw.field("created_at")).map_err(at("created_at"))?,
        payments_made: unwrap_u64(raw.field("payments_made")).map_err(at("payments_made"))?,
        total_payments: unwrap_optional_u64(raw.field("total_payments"))
            .map_err(at("total_payments"))?,
        deposited_balance: balance.to_string(),
        deposited_balance_egld: format_atomic(&balance, EGLD_DECIMALS),
        is_active: unwrap_bool(raw.field("is_active")).map_err(at("is_active"))?,
        interval_type: interval_label(interval_seconds),
    })
}

/// Maps a `List<Subscription>` result. Absent maps to an empty batch.
pub fn map_subscriptions(raw: &TypedValue) -> MappedBatch<Subscription> {
    let mut batch = MappedBatch::default();
    let items: &[TypedValue] = match raw {
        TypedValue::List(items) => items.as_slice(),
        TypedValue::Absent => &[],
        other => {
            batch.warn(format!("expected a list of subscriptions, got {}", other.kind()));
            return batch;
        }
    };

    for (index, item) in items.iter().enumerate() {
        match map_subscription(item) {
            Ok(subscription) => batch.push(subscription),
            Err(err) => {
                tracing::warn!("Skipping malformed subscription at index {}: {}", index, err);
                batch.warn(format!("Skipped subscription at index {}: {}", index, err));
            }
        }
    }
    batch
}

/// `fallback_id` is used when the record itself carries no id.
pub fn map_service(raw: &TypedValue, fallback_id: u64) -> Result<Service, MappingError> {
    let fee = unwrap_biguint(raw.field("amount_per_cycle")).map_err(at("amount_per_cycle"))?;
    let id = match raw.field("id") {
        None | Some(TypedValue::Absent) => fallback_id,
        value => unwrap_u64(value).map_err(at("id"))?,
    };

    Ok(Service {
        id,
        provider: unwrap_address(raw.field("provider")).map_err(at("provider"))?,
        name: unwrap_text(raw.field("name"), "").map_err(at("name"))?,
        description: unwrap_text(raw.field("description"), "").map_err(at("description"))?,
        token: unwrap_text(raw.field("token_identifier"), DEFAULT_TOKEN_IDENTIFIER)
            .map_err(at("token_identifier"))?,
        amount_per_cycle: fee.to_string(),
        amount_per_cycle_egld: format_atomic(&fee, EGLD_DECIMALS),
        frequency_in_blocks: unwrap_u64(raw.field("frequency_in_blocks"))
            .map_err(at("frequency_in_blocks"))?,
        active: unwrap_bool(raw.field("active")).map_err(at("active"))?,
    })
}

pub fn map_vendor_subscription(
    raw: &TypedValue,
    fallback_id: u64,
) -> Result<VendorSubscription, MappingError> {
    let amount = unwrap_biguint(raw.field("amount_per_cycle")).map_err(at("amount_per_cycle"))?;
    let remaining = unwrap_biguint(raw.field("remaining_balance")).map_err(at("remaining_balance"))?;
    let status = unwrap_u8(raw.field("status")).map_err(at("status"))?;
    let id = match raw.field("id") {
        None | Some(TypedValue::Absent) => fallback_id,
        value => unwrap_u64(value).map_err(at("id"))?,
    };

    Ok(VendorSubscription {
        id,
        service_id: unwrap_u64(raw.field("service_id")).map_err(at("service_id"))?,
        client: unwrap_address(raw.field("client")).map_err(at("client"))?,
        vendor: unwrap_address(raw.field("vendor")).map_err(at("vendor"))?,
        amount_per_cycle: amount.to_string(),
        amount_per_cycle_egld: format_atomic(&amount, EGLD_DECIMALS),
        frequency_in_blocks: unwrap_u64(raw.field("frequency_in_blocks"))
            .map_err(at("frequency_in_blocks"))?,
        remaining_balance: remaining.to_string(),
        remaining_balance_egld: format_atomic(&remaining, EGLD_DECIMALS),
        last_payment_block: unwrap_u64(raw.field("last_payment_block"))
            .map_err(at("last_payment_block"))?,
        next_payment_block: unwrap_u64(raw.field("next_payment_block"))
            .map_err(at("next_payment_block"))?,
        status,
        status_label: SubscriptionStatus::from_code(status).label(),
        cancel_effective_block: unwrap_u64(raw.field("cancel_effective_block"))
            .map_err(at("cancel_effective_block"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn field(name: &str, value: TypedValue) -> (String, TypedValue) {
        (name.to_string(), value)
    }

    fn raw_subscription(id: u64, total_payments: TypedValue) -> TypedValue {
        TypedValue::Struct(vec![
            field("id", TypedValue::u64(id)),
            field("payer", TypedValue::Address("erd1payer".to_string())),
            field("recipient", TypedValue::Address("erd1recipient".to_string())),
            field("token_identifier", TypedValue::Text("EGLD".to_string())),
            field(
                "amount_per_payment",
                TypedValue::Numeric(BigUint::from(1_500_000_000_000_000_000u64)),
            ),
            field("interval_seconds", TypedValue::u64(86_400)),
            field("next_payment_time", TypedValue::u64(1_700_000_000)),
            field("created_at", TypedValue::u64(1_699_913_600)),
            field("payments_made", TypedValue::u64(1)),
            field("total_payments", total_payments),
            field(
                "deposited_balance",
                TypedValue::Numeric(BigUint::from(10_000_000_000_000_000_000u128)),
            ),
            field("is_active", TypedValue::Bool(true)),
        ])
    }

    #[test]
    fn maps_a_full_record() {
        let mapped = map_subscription(&raw_subscription(5, TypedValue::Absent)).unwrap();
        assert_eq!(mapped.id, 5);
        assert_eq!(mapped.amount_per_payment, "1500000000000000000");
        assert_eq!(mapped.amount_per_payment_egld, "1.5");
        assert_eq!(mapped.deposited_balance_egld, "10");
        assert_eq!(mapped.next_payment_date, "2023-11-14T22:13:20.000Z");
        assert_eq!(mapped.interval_type, "Daily");
        assert_eq!(mapped.total_payments, None);
        assert!(mapped.is_active);
    }

    #[test]
    fn missing_cap_serializes_as_null() {
        let mapped = map_subscription(&raw_subscription(1, TypedValue::Absent)).unwrap();
        let json = serde_json::to_value(&mapped).unwrap();
        assert!(json["totalPayments"].is_null());

        let capped = map_subscription(&raw_subscription(
            1,
            TypedValue::present(TypedValue::u64(12)),
        ))
        .unwrap();
        assert_eq!(capped.total_payments, Some(12));
    }

    #[test]
    fn empty_struct_takes_defaults() {
        let mapped = map_subscription(&TypedValue::Struct(Vec::new())).unwrap();
        assert_eq!(mapped.id, 0);
        assert_eq!(mapped.payer, "");
        assert_eq!(mapped.token_identifier, "EGLD");
        assert_eq!(mapped.amount_per_payment, "0");
        assert_eq!(mapped.amount_per_payment_egld, "0");
        assert_eq!(mapped.next_payment_date, "1970-01-01T00:00:00.000Z");
        assert_eq!(mapped.interval_type, "Every 0 seconds");
        assert!(!mapped.is_active);
    }

    #[test]
    fn interval_labels() {
        assert_eq!(interval_label(86_400), "Daily");
        assert_eq!(interval_label(604_800), "Weekly");
        assert_eq!(interval_label(2_592_000), "Monthly");
        assert_eq!(interval_label(259_200), "Every 259200 seconds");
    }

    #[test]
    fn wrong_shape_marks_record_malformed() {
        let mut raw = raw_subscription(2, TypedValue::Absent);
        if let TypedValue::Struct(fields) = &mut raw {
            fields[5] = field("interval_seconds", TypedValue::Address("erd1oops".to_string()));
        }
        let err = map_subscription(&raw).unwrap_err();
        assert_eq!(err.field, "interval_seconds");
    }

    #[test]
    fn one_good_one_malformed_gives_one_item_one_warning() {
        let mut bad = raw_subscription(2, TypedValue::Absent);
        if let TypedValue::Struct(fields) = &mut bad {
            fields[0] = field("id", TypedValue::Numeric(BigUint::from(u128::MAX)));
        }
        let batch = map_subscriptions(&TypedValue::List(vec![
            raw_subscription(1, TypedValue::Absent),
            bad,
        ]));
        assert_eq!(batch.items.len(), 1);
        assert_eq!(batch.items[0].id, 1);
        assert_eq!(batch.warnings.len(), 1);
        assert!(batch.warnings[0].contains("index 1"));
    }

    #[test]
    fn absent_list_is_empty() {
        let batch = map_subscriptions(&TypedValue::Absent);
        assert!(batch.items.is_empty());
        assert!(batch.warnings.is_empty());
    }

    #[test]
    fn service_names_decode_from_bytes() {
        let raw = TypedValue::Struct(vec![
            field("provider", TypedValue::Address("erd1provider".to_string())),
            field("name", TypedValue::Bytes(b"Netflix".to_vec())),
            field("description", TypedValue::Bytes("Films & séries".as_bytes().to_vec())),
            field(
                "amount_per_cycle",
                TypedValue::Numeric(BigUint::from(250_000_000_000_000_000u64)),
            ),
            field("frequency_in_blocks", TypedValue::u64(600)),
            field("active", TypedValue::Bool(true)),
        ]);
        let service = map_service(&raw, 7).unwrap();
        assert_eq!(service.id, 7);
        assert_eq!(service.name, "Netflix");
        assert_eq!(service.description, "Films & séries");
        assert_eq!(service.token, "EGLD");
        assert_eq!(service.amount_per_cycle_egld, "0.25");
    }

    #[test]
    fn vendor_subscription_keeps_unknown_status() {
        let raw = TypedValue::Struct(vec![
            field("id", TypedValue::u64(3)),
            field("status", TypedValue::u64(9)),
        ]);
        let mapped = map_vendor_subscription(&raw, 0).unwrap();
        assert_eq!(mapped.status, 9);
        assert_eq!(mapped.status_label, "9");
        assert_eq!(mapped.remaining_balance, "0");
    }

    #[test]
    fn iso_date_rejects_out_of_range() {
        assert!(iso_date(u64::MAX).is_none());
        assert_eq!(iso_date(0).as_deref(), Some("1970-01-01T00:00:00.000Z"));
    }
}
