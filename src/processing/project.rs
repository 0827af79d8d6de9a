//! Column projection.

use crate::types::{ColumnDef, Record, Value};

/// Build a record holding only the `columns` fields, in column order.
///
/// A missing or null source field projects as the empty string: rendered tables show an
/// empty cell rather than `null`.
pub fn project_record(record: &Record, columns: &[ColumnDef]) -> Record {
    let mut out = Record::with_capacity(columns.len());
    for column in columns {
        let value = match record.get(&column.field) {
            Value::Null => Value::Utf8(String::new()),
            other => other.clone(),
        };
        out.insert(column.field.as_str(), value);
    }
    out
}

/// Project every record through [`project_record`].
pub fn project_records(records: &[Record], columns: &[ColumnDef]) -> Vec<Record> {
    records
        .iter()
        .map(|record| project_record(record, columns))
        .collect()
}
