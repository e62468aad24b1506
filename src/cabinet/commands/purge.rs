use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::RecordStore;

/// Compacts the store and reports how many of the stored records were dropped.
pub fn run<S: RecordStore>(store: &mut S) -> Result<CmdResult> {
    let before = store.get_stat()?;
    let purged = store.purge()?;
    let after = store.get_stat()?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Data file processing is completed: {} of {} records were purged.",
        purged,
        before.total + before.deleted
    )));
    Ok(result.with_stat(after))
}
