use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::{RecordStore, SearchField};

pub fn run<S: RecordStore>(store: &S, field: SearchField, value: &str) -> Result<CmdResult> {
    let records = store.find_by(field, value)?;
    let mut result = CmdResult::default();
    if records.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "No records with {} '{}'.",
            field, value
        )));
    }
    Ok(result.with_listed_records(records))
}
