//! Record filtering.

use crate::types::Record;

/// Keep the records for which `predicate` returns `true`, in their original relative order.
pub fn filter_records<F>(records: Vec<Record>, predicate: F) -> Vec<Record>
where
    F: Fn(&Record) -> bool,
{
    records.into_iter().filter(|r| predicate(r)).collect()
}
