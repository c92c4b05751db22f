use bech32::{Bech32, Hrp};
use std::fmt;

use crate::constants::{ADDRESS_HRP, ADDRESS_LENGTH};
use crate::error::{AppError, Result};

/// 32-byte account public key, displayed as `erd1...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; ADDRESS_LENGTH] = bytes.try_into().map_err(|_| {
            AppError::InvalidAddress(format!(
                "expected {} bytes, got {}",
                ADDRESS_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self(raw))
    }

    pub fn from_bech32(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let (hrp, data) = bech32::decode(trimmed)
            .map_err(|e| AppError::InvalidAddress(format!("{}: {}", trimmed, e)))?;
        if !hrp.as_str().eq_ignore_ascii_case(ADDRESS_HRP) {
            return Err(AppError::InvalidAddress(format!(
                "{}: expected '{}' prefix",
                trimmed, ADDRESS_HRP
            )));
        }
        Self::from_bytes(&data)
    }

    pub fn to_bech32(&self) -> String {
        // Both the HRP constant and the payload length are fixed, so encoding cannot fail.
        let hrp = Hrp::parse_unchecked(ADDRESS_HRP);
        bech32::encode::<Bech32>(hrp, &self.0).unwrap_or_default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Contract addresses carry eight leading zero bytes.
    pub fn is_smart_contract(&self) -> bool {
        self.0[..8].iter().all(|b| *b == 0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bech32())
    }
}
