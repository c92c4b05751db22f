//! Conversion between human-readable token amounts and atomic on-chain units.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::{AppError, Result};

/// Parses `<int>[.<frac>]` into atomic units at `decimals` precision.
///
/// Extra fraction digits are truncated, missing ones are zero-padded.
/// Blank input is zero.
pub fn parse_atomic(decimal: &str, decimals: u32) -> Result<BigUint> {
    let trimmed = decimal.trim();
    if trimmed.is_empty() {
        return Ok(BigUint::zero());
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid(decimal));
    }
    if !is_digits(whole) || !is_digits(fraction) {
        return Err(invalid(decimal));
    }

    let width = decimals as usize;
    let mut digits = String::with_capacity(whole.len() + width);
    digits.push_str(whole);
    if fraction.len() >= width {
        digits.push_str(&fraction[..width]);
    } else {
        digits.push_str(fraction);
        digits.extend(std::iter::repeat('0').take(width - fraction.len()));
    }

    if digits.is_empty() {
        return Ok(BigUint::zero());
    }

    BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(|| invalid(decimal))
}

/// Atomic units back to a decimal string without redundant zeros.
pub fn format_atomic(value: &BigUint, decimals: u32) -> String {
    split_digits(&value.to_str_radix(10), decimals)
}

fn split_digits(digits: &str, decimals: u32) -> String {
    let width = decimals as usize;
    let padded = if digits.len() > width {
        digits.to_string()
    } else {
        format!("{:0>len$}", digits, len = width + 1)
    };

    let (whole, fraction) = padded.split_at(padded.len() - width);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

fn is_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

fn invalid(input: &str) -> AppError {
    AppError::InvalidAmount(format!("'{}' is not a non-negative decimal amount", input))
}
