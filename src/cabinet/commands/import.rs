use crate::commands::{CmdMessage, CmdResult, FileFormat};
use crate::error::{CabinetError, Result};
use crate::model::Record;
use crate::snapshot::{csv, xml};
use crate::store::RecordStore;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::warn;

/// Reads records from `path` and creates them one at a time.
///
/// Ids in the file are ignored; the store assigns new ones. A record the
/// store rejects is reported as a warning and skipped. For CSV, lines that do
/// not parse are skipped too. A malformed XML document fails the whole call
/// before anything is created.
pub fn run<S: RecordStore>(store: &mut S, format: FileFormat, path: &Path) -> Result<CmdResult> {
    let file = File::open(path).map_err(|e| {
        CabinetError::Api(format!("Import error: file {} can't be read: {}", path.display(), e))
    })?;
    let reader = BufReader::new(file);

    let mut result = CmdResult::default();
    let records = match format {
        FileFormat::Csv => {
            let parsed = csv::read_records(reader)?;
            for rejected in parsed.rejected {
                result.add_message(CmdMessage::warning(format!(
                    "Line {} skipped: {}",
                    rejected.line, rejected.message
                )));
            }
            parsed.records
        }
        FileFormat::Xml => xml::read_records(reader)?,
    };

    let mut imported = Vec::with_capacity(records.len());
    for Record { id: source_id, fields } in records {
        match store.create_record(&fields) {
            Ok(id) => imported.push(Record::new(id, fields)),
            Err(e) if e.is_recoverable() => {
                warn!(source_id, error = %e, "import rejected record");
                result.add_message(CmdMessage::warning(format!(
                    "Record #{} skipped: {}",
                    source_id, e
                )));
            }
            Err(e) => return Err(e),
        }
    }

    result.add_message(CmdMessage::success(format!(
        "{} records were imported from {}.",
        imported.len(),
        path.display()
    )));
    Ok(result.with_affected_records(imported))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::store::MemoryStore;
    use std::fs;
    use tempfile::TempDir;

    const CSV: &str = "\
Id,First Name,Last Name,Date of Birth,Age,Salary,Gender
10,Jane,Doe,05/01/1990,33,50000.00,F
11,J,Doe,05/01/1990,33,50000.00,F
12,John,Roe,05/01/1990,thirty,50000.00,M
13,John,Roe,02/03/1985,39,100.50,M
";

    #[test]
    fn csv_import_skips_bad_lines_and_invalid_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(&path, CSV).unwrap();

        let mut store = MemoryStore::default();
        let result = run(&mut store, FileFormat::Csv, &path).unwrap();

        let ids: Vec<_> = result.affected_records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.len(), 2);

        let warnings: Vec<_> = result
            .messages
            .iter()
            .filter(|m| m.level == MessageLevel::Warning)
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("Line 4 skipped"));
        assert!(warnings[1].starts_with("Record #11 skipped: First name"));

        let last = result.messages.last().unwrap();
        assert_eq!(last.level, MessageLevel::Success);
        assert!(last.content.starts_with("2 records were imported from"));
    }

    #[test]
    fn malformed_xml_imports_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.xml");
        fs::write(&path, "<records><record id=\"1\">").unwrap();

        let mut store = MemoryStore::default();
        assert!(matches!(
            run(&mut store, FileFormat::Xml, &path).unwrap_err(),
            CabinetError::Xml(_)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut store = MemoryStore::default();
        let err = run(&mut store, FileFormat::Csv, &dir.path().join("none.csv")).unwrap_err();
        assert!(err.to_string().contains("can't be read"));
    }
}
