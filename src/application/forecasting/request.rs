//! Caller-side request normalization.
//!
//! The engine assumes clean input; front ends run requests through these first.

use crate::domain::errors::ForecastError;

pub const MAX_SYMBOL_LEN: usize = 10;

/// Trims and uppercases; accepts 1 to 10 of `A-Z`, `0-9`, `.` and `-`
pub fn normalize_symbol(raw: &str) -> Result<String, ForecastError> {
    let symbol = raw.trim().to_uppercase();
    let valid = !symbol.is_empty()
        && symbol.len() <= MAX_SYMBOL_LEN
        && symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-');

    if valid {
        Ok(symbol)
    } else {
        Err(ForecastError::InvalidRequest {
            reason: format!("invalid symbol '{}'", raw.trim()),
        })
    }
}

/// Out-of-range or missing day counts fall back to `default_days`
pub fn normalize_days(days: Option<i64>, default_days: usize, max_days: usize) -> usize {
    match days {
        Some(d) if d >= 1 && (d as u64) <= max_days as u64 => d as usize,
        _ => default_days,
    }
}

/// Normalized, de-duplicated symbols in request order, invalid ones dropped, at most `max_symbols`
pub fn normalize_batch<S: AsRef<str>>(raw: &[S], max_symbols: usize) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for candidate in raw {
        if symbols.len() >= max_symbols {
            break;
        }
        if let Ok(symbol) = normalize_symbol(candidate.as_ref()) {
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
    }
    symbols
}
