// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the binsort node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-main-object-triage-2026-10-18";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2026-10-18";

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Binsort Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
