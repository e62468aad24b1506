use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{Record, RecordFields};
use crate::store::RecordStore;

pub fn run<S: RecordStore>(store: &mut S, fields: RecordFields) -> Result<CmdResult> {
    let id = store.create_record(&fields)?;

    let mut result = CmdResult::default();
    result.affected_records.push(Record::new(id, fields));
    result.add_message(CmdMessage::success(format!("Record #{} is created.", id)));
    Ok(result)
}
