use crate::commands::{CmdMessage, CmdResult, FileFormat};
use crate::error::{CabinetError, Result};
use crate::generator::RecordGenerator;
use crate::model::RecordId;
use crate::snapshot::Snapshot;
use rand::Rng;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Writes `count` random records, numbered from `start_id`, to `path`.
///
/// Does not touch any store; the file can be fed to `import` afterwards.
pub fn run<R: Rng>(
    generator: &mut RecordGenerator<R>,
    format: FileFormat,
    path: &Path,
    start_id: RecordId,
    count: usize,
) -> Result<CmdResult> {
    if start_id == 0 {
        return Err(CabinetError::Api("Start id must be positive".to_string()));
    }

    let records = generator.generate(start_id, count).ok_or_else(|| {
        CabinetError::Api(format!(
            "{} records starting at id {} run past the largest id {}",
            count,
            start_id,
            RecordId::MAX
        ))
    })?;
    let snapshot = Snapshot::new(records);
    let writer = BufWriter::new(File::create(path).map_err(CabinetError::Io)?);
    match format {
        FileFormat::Csv => snapshot.save_to_csv(writer)?,
        FileFormat::Xml => snapshot.save_to_xml(writer)?,
    }

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "{} records were written to {}.",
        count,
        path.display()
    )));
    Ok(result)
}
