use axum::{extract::State, Json};

use super::extract::{JsonBody, Path, Query};
use super::{require_contract, AppState};
use crate::error::{AppError, Result};
use crate::models::{
    AddressQuery, AmountRequest, CreateSubscriptionRequest, PaymentDueResponse, Subscription,
    TimeUntilPaymentResponse,
};
use crate::services::{SubscriptionService, TransactionBuilder, UnsignedTransaction};

/// GET /subscriptions/user/{address}
///
/// Never fails: any error is logged and answered with an empty list so the
/// dashboard keeps rendering.
pub async fn get_user_subscriptions(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<Vec<Subscription>> {
    let contract = match require_contract(&state) {
        Ok(contract) => contract,
        Err(e) => {
            tracing::warn!("Listing subscriptions for {} failed: {}", address, e);
            return Json(Vec::new());
        }
    };

    match SubscriptionService::new(contract).user_subscriptions(&address).await {
        Ok(batch) => {
            for warning in &batch.warnings {
                tracing::warn!("{}: {}", address, warning);
            }
            Json(batch.items)
        }
        Err(e) => {
            tracing::warn!("Listing subscriptions for {} failed: {}", address, e);
            Json(Vec::new())
        }
    }
}

/// GET /subscriptions/{id}
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Subscription>> {
    let contract = require_contract(&state)?;
    SubscriptionService::new(contract)
        .subscription(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Subscription {} not found", id)))
}

/// GET /subscriptions/{id}/payment-due
pub async fn is_payment_due(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<PaymentDueResponse>> {
    let contract = require_contract(&state)?;
    let is_due = SubscriptionService::new(contract).is_payment_due(id).await?;
    Ok(Json(PaymentDueResponse { is_due }))
}

/// GET /subscriptions/{id}/time-until-payment
pub async fn time_until_payment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<TimeUntilPaymentResponse>> {
    let contract = require_contract(&state)?;
    let seconds = SubscriptionService::new(contract)
        .time_until_next_payment(id)
        .await?;
    Ok(Json(TimeUntilPaymentResponse { seconds }))
}

/// POST /subscriptions/create?address=
pub async fn create_subscription(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
    JsonBody(req): JsonBody<CreateSubscriptionRequest>,
) -> Result<Json<UnsignedTransaction>> {
    let contract = require_contract(&state)?;
    let tx = TransactionBuilder::new(&contract, &state.config)
        .build_create(
            &query.address,
            &req.recipient,
            &req.amount_per_payment,
            &req.initial_deposit,
            req.interval_type,
            req.total_payments,
        )
        .await?;
    Ok(Json(tx))
}

/// POST /subscriptions/cancel/{id}?address=
pub async fn cancel_subscription(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<AddressQuery>,
) -> Result<Json<UnsignedTransaction>> {
    let contract = require_contract(&state)?;
    let tx = TransactionBuilder::new(&contract, &state.config)
        .build_cancel(&query.address, id)
        .await?;
    Ok(Json(tx))
}

/// POST /subscriptions/execute/{id}?address=
pub async fn execute_payment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<AddressQuery>,
) -> Result<Json<UnsignedTransaction>> {
    let contract = require_contract(&state)?;
    let tx = TransactionBuilder::new(&contract, &state.config)
        .build_execute_payment(&query.address, id)
        .await?;
    Ok(Json(tx))
}

/// POST /subscriptions/top-up/{id}?address=
pub async fn top_up_subscription(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<AddressQuery>,
    JsonBody(req): JsonBody<AmountRequest>,
) -> Result<Json<UnsignedTransaction>> {
    let contract = require_contract(&state)?;
    let tx = TransactionBuilder::new(&contract, &state.config)
        .build_top_up(&query.address, id, &req.amount)
        .await?;
    Ok(Json(tx))
}
