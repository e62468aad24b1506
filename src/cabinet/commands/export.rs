use crate::commands::{CmdMessage, CmdResult, FileFormat};
use crate::error::{CabinetError, Result};
use crate::store::RecordStore;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Writes a snapshot of all live records to `path`.
///
/// An existing file is only replaced when `overwrite` is set.
pub fn run<S: RecordStore>(
    store: &S,
    format: FileFormat,
    path: &Path,
    overwrite: bool,
) -> Result<CmdResult> {
    if path.exists() && !overwrite {
        return Err(CabinetError::Api(format!(
            "File {} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(CabinetError::Api(format!(
                "Export failed: can't open directory {}",
                parent.display()
            )));
        }
    }

    let snapshot = store.make_snapshot()?;
    let file = File::create(path).map_err(CabinetError::Io)?;
    let writer = BufWriter::new(file);
    let written = match format {
        FileFormat::Csv => snapshot.save_to_csv(writer),
        FileFormat::Xml => snapshot.save_to_xml(writer),
    };
    if let Err(e) = written {
        let _ = fs::remove_file(path);
        return Err(e);
    }

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "All records are exported to file {}.",
        path.display()
    )));
    Ok(result.with_affected_records(snapshot.into_records()))
}
