use std::path::Path;
use std::sync::Arc;

use crate::abi::{codec, AbiRegistry, TypedValue};
use crate::crypto::Address;
use crate::error::{AppError, Result};
use crate::integrations::{ContractQuery, NetworkProvider};

/// A deployed contract together with its ABI and the network it lives on.
///
/// Reads go through [`ContractClient::query`]; writes only ever produce call
/// data, signing happens in the user's wallet.
pub struct ContractClient {
    address: Address,
    abi: AbiRegistry,
    provider: Arc<dyn NetworkProvider>,
}

impl ContractClient {
    pub fn new(address: &str, abi: AbiRegistry, provider: Arc<dyn NetworkProvider>) -> Result<Self> {
        let address = Address::from_bech32(address)?;
        if !address.is_smart_contract() {
            tracing::warn!("{} does not look like a smart contract address", address);
        }
        Ok(Self {
            address,
            abi,
            provider,
        })
    }

    pub fn from_abi_file(
        address: &str,
        abi_path: impl AsRef<Path>,
        provider: Arc<dyn NetworkProvider>,
    ) -> Result<Self> {
        Self::new(address, AbiRegistry::from_file(abi_path)?, provider)
    }

    pub fn from_abi_json(
        address: &str,
        abi_json: &str,
        provider: Arc<dyn NetworkProvider>,
    ) -> Result<Self> {
        Self::new(address, AbiRegistry::from_json_str(abi_json)?, provider)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn abi(&self) -> &AbiRegistry {
        &self.abi
    }

    /// Runs a view function and returns its first decoded result.
    pub async fn query(&self, function: &str, args: &[TypedValue]) -> Result<TypedValue> {
        let encoded = codec::encode_arguments(&self.abi, function, args).map_err(as_query_failure)?;
        let query = ContractQuery {
            sc_address: self.address.to_bech32(),
            func_name: function.to_string(),
            args: encoded.iter().map(hex::encode).collect(),
            caller: None,
            value: None,
        };

        let response = self.provider.query_contract(&query).await?;
        if !response.is_ok() {
            return Err(AppError::ContractQueryFailed(format!(
                "{} returned {}: {}",
                function, response.return_code, response.return_message
            )));
        }

        let data = response.decoded_return_data()?;
        tracing::debug!("{} returned {} value(s)", function, data.len());
        codec::decode_first_output(&self.abi, function, &data).map_err(as_query_failure)
    }

    /// `function@hex@hex` payload for a state-changing call.
    pub fn call_data(&self, function: &str, args: &[TypedValue]) -> Result<String> {
        if self.abi.endpoint(function)?.readonly {
            return Err(AppError::Abi(format!("{} is a view function", function)));
        }
        let encoded = codec::encode_arguments(&self.abi, function, args)?;
        Ok(codec::call_data(function, &encoded))
    }

    /// Current account nonce, fetched fresh on every call.
    pub async fn account_nonce(&self, address: &Address) -> Result<u64> {
        let account = self.provider.get_account(address).await?;
        tracing::debug!(
            "Account {} nonce={} balance={}",
            account.address,
            account.nonce,
            account.balance
        );
        Ok(account.nonce)
    }
}

fn as_query_failure(err: AppError) -> AppError {
    match err {
        AppError::InvalidAddress(_) | AppError::ContractQueryFailed(_) => err,
        other => AppError::ContractQueryFailed(other.to_string()),
    }
}
