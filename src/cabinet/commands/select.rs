use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::query::SelectQuery;
use crate::store::RecordStore;

/// Lists matching records, projected onto the requested columns.
pub fn run<S: RecordStore>(store: &S, query: &SelectQuery) -> Result<CmdResult> {
    let records = match &query.predicate {
        Some(predicate) => predicate.select(store)?,
        None => store.get_records()?,
    };

    let mut result = CmdResult::default();
    if records.is_empty() {
        result.add_message(CmdMessage::info("No records selected."));
    }
    Ok(result
        .with_listed_records(records)
        .with_columns(query.columns.clone()))
}
