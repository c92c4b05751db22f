use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod abi;
mod api;
mod config;
mod constants;
mod crypto;
mod error;
mod integrations;
mod models;
mod services;
#[cfg(test)]
mod test_support;

use config::Config;
use constants::{API_VERSION, SERVICE_NAME};
use integrations::{MultiversxApiClient, NetworkProvider};
use services::ContractClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scheduled_payments_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting {}", SERVICE_NAME);
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);
    tracing::info!("Network: {} (chain {})", config.network, config.chain_id);
    if config.is_mainnet() {
        tracing::warn!("Running against MAINNET; transactions move real funds");
    }

    let api_client = MultiversxApiClient::new(&config.api_url);
    tracing::info!("MultiversX API: {}", api_client.api_url());
    let provider: Arc<dyn NetworkProvider> = Arc::new(api_client);

    let contract = match config.contract_address() {
        Some(address) => {
            let client = ContractClient::from_abi_file(address, &config.abi_path, provider.clone())
                .map_err(|e| anyhow::anyhow!("Failed to load contract {}: {}", address, e))?;
            tracing::info!(
                "Contract {} loaded ({} with {} endpoints from {})",
                address,
                client.abi().name,
                client.abi().endpoint_count(),
                config.abi_path
            );
            Some(Arc::new(client))
        }
        None => None,
    };

    let platform = match config.platform_contract_address() {
        Some(address) => {
            let client = ContractClient::from_abi_file(
                address,
                &config.platform_abi_path,
                provider.clone(),
            )
            .map_err(|e| anyhow::anyhow!("Failed to load platform contract {}: {}", address, e))?;
            tracing::info!("Platform contract {} loaded", address);
            Some(Arc::new(client))
        }
        None => None,
    };

    let app_state = api::AppState {
        config: config.clone(),
        contract: contract.clone(),
        platform,
    };

    // Build router
    let app = build_router(app_state);

    // Start background services
    tokio::spawn(services::start_background_services(config.clone(), contract));

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    // CORS configuration
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Scheduled payments
        .route(
            "/subscriptions/user/{address}",
            get(api::subscriptions::get_user_subscriptions),
        )
        .route("/subscriptions/{id}", get(api::subscriptions::get_subscription))
        .route(
            "/subscriptions/{id}/payment-due",
            get(api::subscriptions::is_payment_due),
        )
        .route(
            "/subscriptions/{id}/time-until-payment",
            get(api::subscriptions::time_until_payment),
        )
        .route(
            "/subscriptions/create",
            post(api::subscriptions::create_subscription),
        )
        .route(
            "/subscriptions/cancel/{id}",
            post(api::subscriptions::cancel_subscription),
        )
        .route(
            "/subscriptions/execute/{id}",
            post(api::subscriptions::execute_payment),
        )
        .route(
            "/subscriptions/top-up/{id}",
            post(api::subscriptions::top_up_subscription),
        )
        // Subscription platform
        .route("/platform/role/{address}", get(api::platform::get_role))
        .route(
            "/platform/services",
            get(api::platform::list_services).post(api::platform::create_service),
        )
        .route(
            "/platform/subscriptions/user/{address}",
            get(api::platform::list_user_subscriptions),
        )
        .route(
            "/platform/subscriptions/provider/{address}",
            get(api::platform::list_provider_subscriptions),
        )
        .route("/platform/register", post(api::platform::register))
        .route(
            "/platform/subscribe/{service_id}",
            post(api::platform::subscribe),
        )
        .route("/platform/top-up/{id}", post(api::platform::top_up))
        .route("/platform/cancel/{id}", post(api::platform::cancel))
        .route(
            "/platform/finalize/{id}",
            post(api::platform::finalize_cancellation),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
