use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::abi::TypedValue;
use crate::config::Config;
use crate::constants::{EGLD_DECIMALS, TRANSACTION_VERSION};
use crate::crypto::Address;
use crate::error::{AppError, Result};
use crate::models::{CancelledBy, IntervalType, PlatformRole};
use crate::services::amount::{format_atomic, parse_atomic};
use crate::services::contract::ContractClient;
use crate::services::mapper::map_service;

/// Transaction ready for the user's wallet to sign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    pub nonce: u64,
    /// Atomic EGLD.
    pub value: String,
    pub receiver: String,
    pub sender: String,
    pub gas_price: u64,
    pub gas_limit: u64,
    /// Base64 of `function@hex@hex`.
    pub data: String,
    #[serde(rename = "chainID")]
    pub chain_id: String,
    pub version: u32,
}

/// Builds unsigned calls against one contract.
///
/// The sender's nonce is read from the network on every build.
pub struct TransactionBuilder<'a> {
    contract: &'a ContractClient,
    config: &'a Config,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(contract: &'a ContractClient, config: &'a Config) -> Self {
        Self { contract, config }
    }

    pub async fn build_create(
        &self,
        payer: &str,
        recipient: &str,
        amount_per_payment: &str,
        initial_deposit: &str,
        interval: IntervalType,
        total_payments: Option<u64>,
    ) -> Result<UnsignedTransaction> {
        let recipient = Address::from_bech32(recipient)?;
        let per_payment = parse_atomic(amount_per_payment, EGLD_DECIMALS)?;
        let deposit = parse_atomic(initial_deposit, EGLD_DECIMALS)?;

        if deposit < per_payment {
            return Err(AppError::InsufficientDeposit(format!(
                "initial deposit {} EGLD is below one payment of {} EGLD",
                format_atomic(&deposit, EGLD_DECIMALS),
                format_atomic(&per_payment, EGLD_DECIMALS)
            )));
        }

        // A zero cap means "no cap".
        let total_payments = total_payments.filter(|n| *n > 0).map(TypedValue::u64);

        let args = [
            TypedValue::Address(recipient.to_bech32()),
            TypedValue::Numeric(per_payment),
            TypedValue::variant(interval.variant_name()),
            TypedValue::optional(total_payments),
        ];
        self.build(
            payer,
            "createSubscription",
            &args,
            deposit,
            self.config.gas_limit_create,
        )
        .await
    }

    pub async fn build_cancel(&self, payer: &str, subscription_id: u64) -> Result<UnsignedTransaction> {
        self.build(
            payer,
            "cancelSubscription",
            &[TypedValue::u64(subscription_id)],
            BigUint::zero(),
            self.config.gas_limit_default,
        )
        .await
    }

    /// Anyone may trigger a due payment; the contract decides whether it is due.
    pub async fn build_execute_payment(
        &self,
        caller: &str,
        subscription_id: u64,
    ) -> Result<UnsignedTransaction> {
        self.build(
            caller,
            "executePayment",
            &[TypedValue::u64(subscription_id)],
            BigUint::zero(),
            self.config.gas_limit_default,
        )
        .await
    }

    pub async fn build_top_up(
        &self,
        payer: &str,
        subscription_id: u64,
        amount: &str,
    ) -> Result<UnsignedTransaction> {
        let value = parse_atomic(amount, EGLD_DECIMALS)?;
        self.build(
            payer,
            "topUpSubscription",
            &[TypedValue::u64(subscription_id)],
            value,
            self.config.gas_limit_default,
        )
        .await
    }

    pub async fn build_register(&self, sender: &str, role: PlatformRole) -> Result<UnsignedTransaction> {
        let function = match role {
            PlatformRole::User => "registerAsUser",
            PlatformRole::Provider => "registerAsProvider",
        };
        self.build(sender, function, &[], BigUint::zero(), self.config.gas_limit_platform)
            .await
    }

    pub async fn build_create_service(
        &self,
        provider: &str,
        name: &str,
        description: &str,
        amount_per_cycle: &str,
        frequency_in_blocks: u64,
    ) -> Result<UnsignedTransaction> {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("service name is required".to_string()));
        }
        let fee = parse_atomic(amount_per_cycle, EGLD_DECIMALS)?;
        if fee.is_zero() {
            return Err(AppError::InvalidAmount(
                "amount per cycle must be greater than zero".to_string(),
            ));
        }
        if frequency_in_blocks == 0 {
            return Err(AppError::BadRequest(
                "frequency in blocks must be greater than zero".to_string(),
            ));
        }

        let args = [
            TypedValue::Bytes(name.trim().as_bytes().to_vec()),
            TypedValue::Bytes(description.trim().as_bytes().to_vec()),
            TypedValue::Numeric(fee),
            TypedValue::u64(frequency_in_blocks),
        ];
        self.build(
            provider,
            "createService",
            &args,
            BigUint::zero(),
            self.config.gas_limit_platform,
        )
        .await
    }

    /// Checks the deposit against the live service before building.
    pub async fn build_subscribe(
        &self,
        client: &str,
        service_id: u64,
        amount: &str,
    ) -> Result<UnsignedTransaction> {
        let deposit = parse_atomic(amount, EGLD_DECIMALS)?;
        if deposit.is_zero() {
            return Err(AppError::InvalidAmount(
                "deposit must be greater than zero".to_string(),
            ));
        }

        let raw = self
            .contract
            .query("getService", &[TypedValue::u64(service_id)])
            .await?
            .into_option()
            .ok_or_else(|| AppError::NotFound(format!("service {} not found", service_id)))?;
        let service = map_service(&raw, service_id)?;
        if !service.active {
            return Err(AppError::BadRequest(format!("service {} is not active", service_id)));
        }

        let fee: BigUint = service.amount_per_cycle.parse().map_err(|_| {
            AppError::ContractQueryFailed(format!(
                "service {} has an invalid fee '{}'",
                service_id, service.amount_per_cycle
            ))
        })?;
        if deposit < fee {
            return Err(AppError::InsufficientDeposit(format!(
                "deposit {} EGLD is below the {} EGLD fee of service '{}'",
                format_atomic(&deposit, EGLD_DECIMALS),
                service.amount_per_cycle_egld,
                service.name
            )));
        }

        self.build(
            client,
            "subscribe",
            &[TypedValue::u64(service_id)],
            deposit,
            self.config.gas_limit_platform,
        )
        .await
    }

    pub async fn build_platform_top_up(
        &self,
        client: &str,
        subscription_id: u64,
        amount: &str,
    ) -> Result<UnsignedTransaction> {
        let value = parse_atomic(amount, EGLD_DECIMALS)?;
        if value.is_zero() {
            return Err(AppError::InvalidAmount(
                "top-up amount must be greater than zero".to_string(),
            ));
        }
        self.build(
            client,
            "topUp",
            &[TypedValue::u64(subscription_id)],
            value,
            self.config.gas_limit_platform,
        )
        .await
    }

    pub async fn build_platform_cancel(
        &self,
        sender: &str,
        subscription_id: u64,
        by: CancelledBy,
    ) -> Result<UnsignedTransaction> {
        let function = match by {
            CancelledBy::User => "cancelSubscriptionByUser",
            CancelledBy::Provider => "cancelSubscriptionByProvider",
        };
        self.build(
            sender,
            function,
            &[TypedValue::u64(subscription_id)],
            BigUint::zero(),
            self.config.gas_limit_platform,
        )
        .await
    }

    pub async fn build_finalize_cancellation(
        &self,
        sender: &str,
        subscription_id: u64,
    ) -> Result<UnsignedTransaction> {
        self.build(
            sender,
            "finalizeCancellation",
            &[TypedValue::u64(subscription_id)],
            BigUint::zero(),
            self.config.gas_limit_platform,
        )
        .await
    }

    async fn build(
        &self,
        sender: &str,
        function: &str,
        args: &[TypedValue],
        value: BigUint,
        gas_limit: u64,
    ) -> Result<UnsignedTransaction> {
        let sender = Address::from_bech32(sender)?;
        if !value.is_zero() && !self.contract.abi().endpoint(function)?.payable {
            return Err(AppError::BadRequest(format!("{} does not accept EGLD", function)));
        }
        let data = self.contract.call_data(function, args)?;
        let nonce = self.contract.account_nonce(&sender).await?;

        tracing::info!(
            "Built {} for {} (nonce={}, value={}, gas={})",
            function,
            sender,
            nonce,
            value,
            gas_limit
        );

        Ok(UnsignedTransaction {
            nonce,
            value: value.to_string(),
            receiver: self.contract.address().to_bech32(),
            sender: sender.to_bech32(),
            gas_price: self.config.gas_price,
            gas_limit,
            data: BASE64.encode(data.as_bytes()),
            chain_id: self.config.chain_id.clone(),
            version: TRANSACTION_VERSION,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        address, encoded_service, platform_client, scheduled_client, some, MockProvider,
    };

    fn decoded_data(tx: &UnsignedTransaction) -> String {
        String::from_utf8(BASE64.decode(&tx.data).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn create_attaches_deposit_and_create_gas() {
        let client = scheduled_client(MockProvider::new().with_nonce(4));
        let config = Config::default();
        let builder = TransactionBuilder::new(&client, &config);

        let tx = builder
            .build_create(&address(1), &address(2), "1.5", "10", IntervalType::Weekly, Some(12))
            .await
            .unwrap();

        assert_eq!(tx.nonce, 4);
        assert_eq!(tx.value, "10000000000000000000");
        assert_eq!(tx.gas_limit, 15_000_000);
        assert_eq!(tx.gas_price, 1_000_000_000);
        assert_eq!(tx.chain_id, "D");
        assert_eq!(tx.version, 1);
        assert_eq!(tx.sender, address(1));
        assert_eq!(tx.receiver, client.address().to_bech32());

        let data = decoded_data(&tx);
        let parts: Vec<&str> = data.split('@').collect();
        assert_eq!(parts[0], "createSubscription");
        assert_eq!(parts[2], "14d1120d7b160000");
        assert_eq!(parts[3], "01");
        assert_eq!(parts[4], "01000000000000000c");
    }

    #[tokio::test]
    async fn deposit_below_one_payment_is_rejected() {
        let client = scheduled_client(MockProvider::new());
        let config = Config::default();
        let builder = TransactionBuilder::new(&client, &config);

        let err = builder
            .build_create(&address(1), &address(2), "1.5", "1", IntervalType::Daily, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientDeposit(_)));
    }

    #[tokio::test]
    async fn uncapped_create_sends_empty_option() {
        let client = scheduled_client(MockProvider::new());
        let config = Config::default();
        let builder = TransactionBuilder::new(&client, &config);

        for cap in [None, Some(0)] {
            let tx = builder
                .build_create(&address(1), &address(2), "1", "1", IntervalType::Daily, cap)
                .await
                .unwrap();
            let data = decoded_data(&tx);
            assert!(data.ends_with("@@"), "unexpected call data {data}");
        }
    }

    #[tokio::test]
    async fn cancel_execute_and_top_up() {
        let client = scheduled_client(MockProvider::new().with_nonce(8));
        let config = Config::default();
        let builder = TransactionBuilder::new(&client, &config);

        let cancel = builder.build_cancel(&address(1), 7).await.unwrap();
        assert_eq!(decoded_data(&cancel), "cancelSubscription@07");
        assert_eq!(cancel.value, "0");
        assert_eq!(cancel.gas_limit, 10_000_000);

        let execute = builder.build_execute_payment(&address(5), 7).await.unwrap();
        assert_eq!(decoded_data(&execute), "executePayment@07");
        assert_eq!(execute.sender, address(5));

        let top_up = builder.build_top_up(&address(1), 7, "5").await.unwrap();
        assert_eq!(decoded_data(&top_up), "topUpSubscription@07");
        assert_eq!(top_up.value, "5000000000000000000");
        assert_eq!(top_up.nonce, 8);
    }

    #[tokio::test]
    async fn invalid_inputs_are_client_errors() {
        let client = scheduled_client(MockProvider::new());
        let config = Config::default();
        let builder = TransactionBuilder::new(&client, &config);

        assert!(matches!(
            builder.build_cancel("erd1broken", 1).await,
            Err(AppError::InvalidAddress(_))
        ));
        assert!(matches!(
            builder.build_top_up(&address(1), 1, "-3").await,
            Err(AppError::InvalidAmount(_))
        ));
        assert!(matches!(
            builder
                .build_create(&address(1), "nope", "1", "1", IntervalType::Daily, None)
                .await,
            Err(AppError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn nonce_failure_propagates() {
        let client = scheduled_client(MockProvider::new().offline());
        let config = Config::default();
        let builder = TransactionBuilder::new(&client, &config);
        assert!(matches!(
            builder.build_cancel(&address(1), 1).await,
            Err(AppError::ContractQueryFailed(_))
        ));
    }

    #[tokio::test]
    async fn subscribe_checks_service_fee() {
        let provider = MockProvider::new().returning(
            "getService",
            vec![some(encoded_service(3, "Gym", "1bc16d674ec80000", true))],
        );
        let client = platform_client(provider);
        let config = Config::default();
        let builder = TransactionBuilder::new(&client, &config);

        let err = builder.build_subscribe(&address(4), 3, "1").await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientDeposit(_)));

        let tx = builder.build_subscribe(&address(4), 3, "2").await.unwrap();
        assert_eq!(decoded_data(&tx), "subscribe@03");
        assert_eq!(tx.value, "2000000000000000000");
        assert_eq!(tx.gas_limit, 30_000_000);
    }

    #[tokio::test]
    async fn subscribe_compares_against_the_exact_fee() {
        let provider = MockProvider::new().returning(
            "getService",
            vec![some(encoded_service(3, "Gym", "1bc16d674ec80000", true))],
        );
        let client = platform_client(provider);
        let config = Config::default();
        let builder = TransactionBuilder::new(&client, &config);

        assert!(matches!(
            builder.build_subscribe(&address(4), 3, "1.999999999999999999").await,
            Err(AppError::InsufficientDeposit(_))
        ));
        assert!(builder.build_subscribe(&address(4), 3, "2.0").await.is_ok());
    }

    #[tokio::test]
    async fn subscribe_to_unknown_service_is_not_found() {
        let client = platform_client(MockProvider::new().returning("getService", vec![vec![]]));
        let config = Config::default();
        let builder = TransactionBuilder::new(&client, &config);
        assert!(matches!(
            builder.build_subscribe(&address(4), 99, "1").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn subscribe_to_inactive_service_is_rejected() {
        let provider = MockProvider::new().returning(
            "getService",
            vec![some(encoded_service(3, "Gym", "01", false))],
        );
        let client = platform_client(provider);
        let config = Config::default();
        let builder = TransactionBuilder::new(&client, &config);
        assert!(matches!(
            builder.build_subscribe(&address(4), 3, "1").await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn platform_calls_use_platform_gas() {
        let client = platform_client(MockProvider::new());
        let config = Config::default();
        let builder = TransactionBuilder::new(&client, &config);

        let register = builder.build_register(&address(1), PlatformRole::Provider).await.unwrap();
        assert_eq!(decoded_data(&register), "registerAsProvider");
        assert_eq!(register.gas_limit, 30_000_000);

        let service = builder
            .build_create_service(&address(1), "Gym", "Monthly pass", "0.5", 600)
            .await
            .unwrap();
        assert_eq!(
            decoded_data(&service),
            "createService@47796d@4d6f6e74686c792070617373@06f05b59d3b20000@0258"
        );

        let cancel = builder
            .build_platform_cancel(&address(1), 2, CancelledBy::Provider)
            .await
            .unwrap();
        assert_eq!(decoded_data(&cancel), "cancelSubscriptionByProvider@02");

        let finalize = builder.build_finalize_cancellation(&address(1), 2).await.unwrap();
        assert_eq!(decoded_data(&finalize), "finalizeCancellation@02");
    }

    #[tokio::test]
    async fn create_service_validates_inputs() {
        let client = platform_client(MockProvider::new());
        let config = Config::default();
        let builder = TransactionBuilder::new(&client, &config);

        assert!(matches!(
            builder.build_create_service(&address(1), "Gym", "", "0", 600).await,
            Err(AppError::InvalidAmount(_))
        ));
        assert!(matches!(
            builder.build_create_service(&address(1), "Gym", "", "1", 0).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            builder.build_create_service(&address(1), "  ", "", "1", 10).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
