// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Label to bin mapping

use binsort_node::detection::{CategoryMapper, CategoryTableError, DEFAULT_CATEGORY};
use std::io::Write;

#[test]
fn test_builtin_table() {
    let mapper = CategoryMapper::default();
    assert_eq!(mapper.map_to_category("banana"), "GFT");
    assert_eq!(mapper.map_to_category("Banana "), "GFT");
    assert_eq!(mapper.map_to_category("unicorn"), DEFAULT_CATEGORY);
    assert_eq!(mapper.map_to_category(""), "Restafval");
}

#[test]
fn test_table_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
default = "Overig"

[categories]
banana = "Compost"
bottle = "Plastic"
"#
    )
    .unwrap();

    let mapper = CategoryMapper::from_toml_file(file.path()).unwrap();
    assert_eq!(mapper.len(), 2);
    assert_eq!(mapper.map_to_category("bottle"), "Plastic");
    assert_eq!(mapper.map_to_category("cup"), "Overig");
    assert_eq!(mapper.default_category(), "Overig");
}

#[test]
fn test_table_without_default_uses_builtin_default() {
    let mapper = CategoryMapper::from_toml_str("[categories]\nbanana = \"GFT\"\n").unwrap();
    assert_eq!(mapper.map_to_category("cup"), DEFAULT_CATEGORY);
}

#[test]
fn test_duplicate_labels_rejected() {
    let err = CategoryMapper::from_pairs([("Banana", "GFT"), ("banana", "PMD")], "Rest").unwrap_err();
    assert!(matches!(err, CategoryTableError::DuplicateLabel(_)));
}

#[test]
fn test_missing_file() {
    let err = CategoryMapper::from_toml_file("/nonexistent/bins.toml").unwrap_err();
    assert!(matches!(err, CategoryTableError::Io { .. }));
}
