use crate::error::{CabinetError, Result};
use crate::model::{format_date, Record, RecordFields, RecordId};
use csv::{ReaderBuilder, StringRecord, Writer};
use std::io::{Read, Write};
use tracing::warn;

pub const HEADER: [&str; 7] = [
    "Id",
    "First Name",
    "Last Name",
    "Date of Birth",
    "Age",
    "Salary",
    "Gender",
];

/// A line the reader could not turn into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    pub line: u64,
    pub message: String,
}

/// Outcome of reading a CSV document.
#[derive(Debug, Default)]
pub struct ParsedRecords {
    pub records: Vec<Record>,
    pub rejected: Vec<RejectedLine>,
}

pub fn write_records<W: Write>(records: &[Record], writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for record in records {
        let f = &record.fields;
        wtr.write_record([
            record.id.to_string(),
            f.first_name.clone(),
            f.last_name.clone(),
            format_date(f.date_of_birth),
            f.age.to_string(),
            f.salary.to_string(),
            f.gender.to_string(),
        ])?;
    }
    wtr.flush().map_err(CabinetError::Io)?;
    Ok(())
}

/// Reads every data line after the header.
///
/// Lines with the wrong field count or unparseable values are skipped and
/// listed in [`ParsedRecords::rejected`]. Only I/O failures abort the read.
pub fn read_records<R: Read>(reader: R) -> Result<ParsedRecords> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut parsed = ParsedRecords::default();
    for row in rdr.records() {
        let outcome = match row {
            Ok(row) => {
                let line = row.position().map(|p| p.line()).unwrap_or_default();
                parse_row(&row).map_err(|e| (line, e.to_string()))
            }
            Err(e) if e.is_io_error() => return Err(CabinetError::Csv(e)),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                Err((line, e.to_string()))
            }
        };
        match outcome {
            Ok(record) => parsed.records.push(record),
            Err((line, message)) => {
                warn!(line, %message, "skipping CSV line");
                parsed.rejected.push(RejectedLine { line, message });
            }
        }
    }
    Ok(parsed)
}

fn parse_row(row: &StringRecord) -> Result<Record> {
    if row.len() != HEADER.len() {
        return Err(CabinetError::Format(format!(
            "expected {} fields, found {}",
            HEADER.len(),
            row.len()
        )));
    }
    let id: RecordId = row[0]
        .trim()
        .parse()
        .map_err(|_| CabinetError::Format(format!("invalid id '{}'", row[0].trim())))?;
    let fields = RecordFields::parse(&row[1], &row[2], &row[3], &row[4], &row[5], &row[6])?;
    Ok(Record::new(id, fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = "\
Id,First Name,Last Name,Date of Birth,Age,Salary,Gender
1,Jane,Doe,05/01/1990,33,50000.00,F
2,John,Roe,not-a-date,40,1000,M
3,Ann,Poe,01/02/1970,55,abc,F
4,Too,Few,01/02/1970
5,\"Smith, Jr.\",Lee,12/31/1999,24,0.5,M
";

    #[test]
    fn writes_header_and_formatted_rows() {
        let fields = RecordFields::parse("Jane", "Doe", "1990-05-01", "33", "50000.00", "F").unwrap();
        let mut out = Vec::new();
        write_records(&[Record::new(1, fields)], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Id,First Name,Last Name,Date of Birth,Age,Salary,Gender");
        assert_eq!(lines[1], "1,Jane,Doe,05/01/1990,33,50000.00,F");
    }

    #[test]
    fn bad_lines_are_skipped_and_reported() {
        let parsed = read_records(DOCUMENT.as_bytes()).unwrap();

        let ids: Vec<_> = parsed.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 5]);
        let lines: Vec<_> = parsed.rejected.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert!(parsed.rejected[0].message.contains("invalid date"));
        assert!(parsed.rejected[1].message.contains("invalid salary"));
        assert!(parsed.rejected[2].message.contains("expected 7 fields"));
    }

    #[test]
    fn quoted_commas_survive() {
        let parsed = read_records(DOCUMENT.as_bytes()).unwrap();
        assert_eq!(parsed.records[1].fields.first_name, "Smith, Jr.");
    }

    #[test]
    fn header_only_document_is_empty() {
        let parsed = read_records(HEADER.join(",").as_bytes()).unwrap();
        assert!(parsed.records.is_empty());
        assert!(parsed.rejected.is_empty());
    }
}
