/// Application constants

// Token precision
pub const EGLD_DECIMALS: u32 = 18;
pub const DEFAULT_TOKEN_IDENTIFIER: &str = "EGLD";

// Address encoding
pub const ADDRESS_HRP: &str = "erd";
pub const ADDRESS_LENGTH: usize = 32;

// Gas configuration
pub const GAS_LIMIT_CREATE_SUBSCRIPTION: u64 = 15_000_000;
pub const GAS_LIMIT_DEFAULT: u64 = 10_000_000;
pub const GAS_LIMIT_PLATFORM_CALL: u64 = 30_000_000;
pub const GAS_PRICE_DEFAULT: u64 = 1_000_000_000;
pub const TRANSACTION_VERSION: u32 = 1;

// Interval lengths (seconds)
pub const SECONDS_PER_DAY: u64 = 86_400;
pub const SECONDS_PER_WEEK: u64 = 604_800;
pub const SECONDS_PER_MONTH: u64 = 2_592_000; // 30 days

// Platform roles
pub const ROLE_USER: u8 = 1;
pub const ROLE_PROVIDER: u8 = 2;

// Service identity
pub const SERVICE_NAME: &str = "scheduled-payments-backend";
pub const API_VERSION: &str = "v1";

// Network defaults
pub const DEFAULT_API_URL: &str = "https://devnet-api.multiversx.com";
pub const DEFAULT_CHAIN_ID: &str = "D";
pub const DEFAULT_ABI_PATH: &str = "abi/scheduled-payments-contract.abi.json";
pub const DEFAULT_PLATFORM_ABI_PATH: &str = "abi/subscription-platform.abi.json";

// Background service intervals
pub const REFRESH_INTERVAL_SECS: u64 = 10;
