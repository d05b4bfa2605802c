// Utility helpers for amounts and addresses

use ethers::types::{Address, U256};
use ethers::utils::{format_units, to_checksum};

use crate::error::{AppError, Result};

/// Formats base units as a decimal with at least one fractional digit and
/// trailing zeros trimmed (`10^18` at 18 decimals renders as `1.0`).
pub fn format_amount(value: U256, decimals: u32) -> Result<String> {
    let full = format_units(value, decimals)
        .map_err(|e| AppError::Internal(format!("Unit conversion failed: {}", e)))?;
    Ok(compact_decimal(&full))
}

fn compact_decimal(full: &str) -> String {
    match full.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                format!("{}.0", whole)
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => format!("{}.0", full),
    }
}

/// Parses user input such as `0.01` into base units. Rejects empty,
/// signed, non-numeric, zero and over-precise amounts.
pub fn parse_amount(input: &str, decimals: u32) -> Result<U256> {
    let invalid = || AppError::Validation("Please enter a valid amount".to_string());
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > decimals as usize {
        return Err(invalid());
    }

    // Scaled by hand so an oversized amount is rejected instead of overflowing.
    let whole = U256::from_dec_str(if whole.is_empty() { "0" } else { whole })
        .map_err(|_| invalid())?;
    let frac_digits = format!("{:0<width$}", frac, width = decimals as usize);
    let frac = if frac_digits.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(&frac_digits).map_err(|_| invalid())?
    };
    let scale = U256::from(10u8)
        .checked_pow(U256::from(decimals))
        .ok_or_else(invalid)?;
    let value = whole
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac))
        .ok_or_else(invalid)?;
    if value.is_zero() {
        return Err(invalid());
    }
    Ok(value)
}

/// `0x742D...BEb0` style shortening of a checksummed address.
pub fn shorten_address(address: &Address) -> String {
    let full = to_checksum(address, None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

pub fn checksum(address: &Address) -> String {
    to_checksum(address, None)
}
