use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::RecordId;
use crate::store::RecordStore;

pub fn run<S: RecordStore>(store: &mut S, id: RecordId) -> Result<CmdResult> {
    store.remove_record(id)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Record #{} is removed.", id)));
    Ok(result)
}
