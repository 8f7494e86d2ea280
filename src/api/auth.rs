// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Pre-shared API key check

use axum::http::HeaderMap;

/// Header carrying the pre-shared key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extract the credential from request headers, if present and valid UTF-8
pub fn credential_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
}

/// Compare a presented credential against the configured key
///
/// Runs in time independent of where the inputs first differ.
pub fn verify_api_key(expected: &str, presented: Option<&str>) -> bool {
    match presented {
        Some(presented) if !expected.is_empty() => {
            constant_time_eq(expected.as_bytes(), presented.as_bytes())
        }
        _ => false,
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
