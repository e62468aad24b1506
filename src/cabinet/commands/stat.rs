use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::RecordStore;

pub fn run<S: RecordStore>(store: &S) -> Result<CmdResult> {
    let stat = store.get_stat()?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!("{}.", stat)));
    Ok(result.with_stat(stat))
}
