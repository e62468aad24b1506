use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::query::Predicate;
use crate::store::RecordStore;

/// Removes every record matching `predicate`.
pub fn run<S: RecordStore>(store: &mut S, predicate: &Predicate) -> Result<CmdResult> {
    let matched = predicate.select(&*store)?;

    let mut result = CmdResult::default();
    if matched.is_empty() {
        result.add_message(CmdMessage::info(format!("No records match {}.", predicate)));
        return Ok(result);
    }

    for record in &matched {
        store.remove_record(record.id)?;
    }

    let ids: Vec<String> = matched.iter().map(|r| format!("#{}", r.id)).collect();
    let message = if ids.len() == 1 {
        format!("Record {} is deleted.", ids[0])
    } else {
        format!("Records {} are deleted.", ids.join(", "))
    };
    result.add_message(CmdMessage::success(message));
    Ok(result.with_affected_records(matched))
}
