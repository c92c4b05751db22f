use axum::{extract::State, Json};

use super::extract::{JsonBody, Path, Query};
use super::{require_platform, AppState};
use crate::error::Result;
use crate::models::{
    AddressQuery, AmountRequest, CancelQuery, CreateServiceRequest, MappedBatch, RegisterQuery,
    RoleResponse, Service, VendorSubscription,
};
use crate::services::{PlatformService, TransactionBuilder, UnsignedTransaction};

/// GET /platform/role/{address}
pub async fn get_role(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<RoleResponse>> {
    let platform = require_platform(&state)?;
    let role = PlatformService::new(platform).user_role(&address).await?;
    Ok(Json(RoleResponse::from_code(role)))
}

/// GET /platform/services
pub async fn list_services(State(state): State<AppState>) -> Result<Json<MappedBatch<Service>>> {
    let platform = require_platform(&state)?;
    Ok(Json(PlatformService::new(platform).services().await?))
}

/// GET /platform/subscriptions/user/{address}
pub async fn list_user_subscriptions(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<MappedBatch<VendorSubscription>>> {
    let platform = require_platform(&state)?;
    Ok(Json(
        PlatformService::new(platform)
            .user_subscriptions(&address)
            .await?,
    ))
}

/// GET /platform/subscriptions/provider/{address}
pub async fn list_provider_subscriptions(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<MappedBatch<VendorSubscription>>> {
    let platform = require_platform(&state)?;
    Ok(Json(
        PlatformService::new(platform)
            .provider_subscriptions(&address)
            .await?,
    ))
}

/// POST /platform/register?address=&role=user|provider
pub async fn register(
    State(state): State<AppState>,
    Query(query): Query<RegisterQuery>,
) -> Result<Json<UnsignedTransaction>> {
    let platform = require_platform(&state)?;
    let tx = TransactionBuilder::new(&platform, &state.config)
        .build_register(&query.address, query.role)
        .await?;
    Ok(Json(tx))
}

/// POST /platform/services?address=
pub async fn create_service(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
    JsonBody(req): JsonBody<CreateServiceRequest>,
) -> Result<Json<UnsignedTransaction>> {
    let platform = require_platform(&state)?;
    let tx = TransactionBuilder::new(&platform, &state.config)
        .build_create_service(
            &query.address,
            &req.name,
            &req.description,
            &req.amount_per_cycle,
            req.frequency_in_blocks,
        )
        .await?;
    Ok(Json(tx))
}

/// POST /platform/subscribe/{service_id}?address=
pub async fn subscribe(
    State(state): State<AppState>,
    Path(service_id): Path<u64>,
    Query(query): Query<AddressQuery>,
    JsonBody(req): JsonBody<AmountRequest>,
) -> Result<Json<UnsignedTransaction>> {
    let platform = require_platform(&state)?;
    let tx = TransactionBuilder::new(&platform, &state.config)
        .build_subscribe(&query.address, service_id, &req.amount)
        .await?;
    Ok(Json(tx))
}

/// POST /platform/top-up/{id}?address=
pub async fn top_up(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<AddressQuery>,
    JsonBody(req): JsonBody<AmountRequest>,
) -> Result<Json<UnsignedTransaction>> {
    let platform = require_platform(&state)?;
    let tx = TransactionBuilder::new(&platform, &state.config)
        .build_platform_top_up(&query.address, id, &req.amount)
        .await?;
    Ok(Json(tx))
}

/// POST /platform/cancel/{id}?address=&by=user|provider
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<CancelQuery>,
) -> Result<Json<UnsignedTransaction>> {
    let platform = require_platform(&state)?;
    let tx = TransactionBuilder::new(&platform, &state.config)
        .build_platform_cancel(&query.address, id, query.by)
        .await?;
    Ok(Json(tx))
}

/// POST /platform/finalize/{id}?address=
pub async fn finalize_cancellation(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<AddressQuery>,
) -> Result<Json<UnsignedTransaction>> {
    let platform = require_platform(&state)?;
    let tx = TransactionBuilder::new(&platform, &state.config)
        .build_finalize_cancellation(&query.address, id)
        .await?;
    Ok(Json(tx))
}
