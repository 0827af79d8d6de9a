use std::fs;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use table_pipeline::config::{TableCatalog, TableConfig};
use table_pipeline::filter::FilterNode;
use table_pipeline::source::DataSourceRef;
use table_pipeline::types::ColumnDef;
use table_pipeline::{ErrorKind, TableError};

const JSON: &str = r#"{
  "tables": {
    "orders": {
      "data-source": "shop.orders()",
      "columns": [
        {"field": "id", "label": "Order"},
        {"field-name": "total"}
      ],
      "filter": {
        "type": "or",
        "conditions": [
          {"type": "in", "field": "state", "values": ["open", "HELD"], "case-insensitive": true},
          {"type": "greater-than", "field": "total", "value": 100.5}
        ]
      }
    }
  }
}"#;

#[test]
fn loads_yaml_and_json_by_extension() {
    let dir = tempdir().unwrap();

    let json_path = dir.path().join("tables.json");
    fs::write(&json_path, JSON).unwrap();
    let from_json = TableConfig::from_path(&json_path).unwrap();

    let orders = from_json.get("orders").unwrap();
    assert_eq!(orders.data_source, DataSourceRef::new("shop", "orders"));
    assert_eq!(
        orders.columns,
        vec![ColumnDef::new("id", "Order"), ColumnDef::from_field("total")]
    );
    assert_eq!(
        orders.filter,
        Some(FilterNode::or([
            FilterNode::one_of("state", ["open", "HELD"]).ignore_case(),
            FilterNode::greater_than("total", 100.5),
        ]))
    );

    // Same config re-encoded as YAML under an upper-case extension.
    let yaml_path = dir.path().join("tables.YML");
    fs::write(&yaml_path, serde_yaml::to_string(&from_json).unwrap()).unwrap();
    assert_eq!(TableConfig::from_path(&yaml_path).unwrap(), from_json);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = TableConfig::from_path(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, TableError::Io(_)));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn invalid_content_is_rejected_with_format() {
    let dir = tempdir().unwrap();

    let path = dir.path().join("bad.yaml");
    fs::write(&path, "tables: [1, 2").unwrap();
    assert!(matches!(
        TableConfig::from_path(&path).unwrap_err(),
        TableError::ConfigParse { format: "yaml", .. }
    ));

    let path = dir.path().join("unknown-type.json");
    fs::write(
        &path,
        r#"{"tables": {"t": {"data-source": "a.b", "filter": {"type": "between", "field": "x"}}}}"#,
    )
    .unwrap();
    assert!(matches!(
        TableConfig::from_path(&path).unwrap_err(),
        TableError::ConfigParse { format: "json", .. }
    ));

    let path = dir.path().join("tables.toml");
    fs::write(&path, "").unwrap();
    assert!(matches!(
        TableConfig::from_path(&path).unwrap_err(),
        TableError::InvalidConfig { .. }
    ));
}

#[test]
fn catalog_swaps_reloaded_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tables.yaml");

    fs::write(&path, "tables:\n  first:\n    data-source: a.b\n").unwrap();
    let catalog = TableCatalog::new(TableConfig::from_path(&path).unwrap());
    let held = catalog.snapshot();

    fs::write(
        &path,
        "tables:\n  second:\n    data-source: a.c\n  third:\n    data-source: a.d\n",
    )
    .unwrap();
    catalog.replace(TableConfig::from_path(&path).unwrap());

    assert_eq!(catalog.table_names(), vec!["second", "third"]);
    assert!(!catalog.contains("first"));
    assert!(held.contains("first"));
}
