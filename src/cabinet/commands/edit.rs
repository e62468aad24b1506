use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{Record, RecordFields, RecordId};
use crate::store::RecordStore;

pub fn run<S: RecordStore>(store: &mut S, id: RecordId, fields: RecordFields) -> Result<CmdResult> {
    store.edit_record(id, &fields)?;

    let mut result = CmdResult::default();
    result.affected_records.push(Record::new(id, fields));
    result.add_message(CmdMessage::success(format!("Record #{} is updated.", id)));
    Ok(result)
}
