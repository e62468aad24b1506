//! XML interchange.
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <records>
//!   <record id="1">
//!     <name first="Jane" last="Doe"/>
//!     <dateOfBirth>05/01/1990</dateOfBirth>
//!     <age>33</age>
//!     <salary>50000.00</salary>
//!     <gender>F</gender>
//!   </record>
//! </records>
//! ```

use crate::error::{CabinetError, Result};
use crate::model::{format_date, parse_age, parse_date, parse_gender, parse_salary};
use crate::model::{Record, RecordFields, RecordId};
use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";
const ROOT: &str = "records";

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecordsXml {
    #[serde(rename = "record", default)]
    records: Vec<RecordXml>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordXml {
    #[serde(rename = "@id")]
    id: RecordId,
    name: NameXml,
    date_of_birth: String,
    age: String,
    salary: String,
    gender: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct NameXml {
    #[serde(rename = "@first")]
    first: String,
    #[serde(rename = "@last")]
    last: String,
}

impl From<&Record> for RecordXml {
    fn from(record: &Record) -> Self {
        let f = &record.fields;
        Self {
            id: record.id,
            name: NameXml {
                first: f.first_name.clone(),
                last: f.last_name.clone(),
            },
            date_of_birth: format_date(f.date_of_birth),
            age: f.age.to_string(),
            salary: f.salary.to_string(),
            gender: f.gender.to_string(),
        }
    }
}

impl TryFrom<RecordXml> for Record {
    type Error = CabinetError;

    fn try_from(xml: RecordXml) -> Result<Self> {
        let fields = RecordFields {
            first_name: xml.name.first.trim().to_string(),
            last_name: xml.name.last.trim().to_string(),
            date_of_birth: parse_date(&xml.date_of_birth)?,
            age: parse_age(&xml.age)?,
            salary: parse_salary(&xml.salary)?,
            gender: parse_gender(&xml.gender)?,
        };
        Ok(Record::new(xml.id, fields))
    }
}

pub fn write_records<W: Write>(records: &[Record], mut writer: W) -> Result<()> {
    let document = RecordsXml {
        records: records.iter().map(RecordXml::from).collect(),
    };

    let mut body = String::new();
    let mut ser = Serializer::with_root(&mut body, Some(ROOT))
        .map_err(|e| CabinetError::Xml(e.to_string()))?;
    ser.indent(' ', 2);
    document
        .serialize(ser)
        .map_err(|e| CabinetError::Xml(e.to_string()))?;

    writer.write_all(DECLARATION.as_bytes()).map_err(CabinetError::Io)?;
    writer.write_all(body.as_bytes()).map_err(CabinetError::Io)?;
    writer.write_all(b"\n").map_err(CabinetError::Io)?;
    writer.flush().map_err(CabinetError::Io)?;
    Ok(())
}

/// Reads a whole document. Any malformed element or value fails the read.
pub fn read_records<R: Read>(mut reader: R) -> Result<Vec<Record>> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(CabinetError::Io)?;

    let document: RecordsXml =
        quick_xml::de::from_str(&text).map_err(|e| CabinetError::Xml(e.to_string()))?;

    document
        .records
        .into_iter()
        .map(|xml| {
            let id = xml.id;
            Record::try_from(xml)
                .map_err(|e| CabinetError::Xml(format!("record {}: {}", id, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> Record {
        let fields = RecordFields::parse("Jane", "Doe", "1990-05-01", "33", "50000.00", "F").unwrap();
        Record::new(1, fields)
    }

    fn write(records: &[Record]) -> String {
        let mut out = Vec::new();
        write_records(records, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn writes_expected_structure() {
        let text = write(&[jane()]);
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(text.contains("<records>"));
        assert!(text.contains("<record id=\"1\">"));
        assert!(text.contains("<name first=\"Jane\" last=\"Doe\"/>"));
        assert!(text.contains("<dateOfBirth>05/01/1990</dateOfBirth>"));
        assert!(text.contains("<salary>50000.00</salary>"));
        assert!(text.contains("<gender>F</gender>"));
    }

    #[test]
    fn reads_what_it_writes() {
        let records = vec![jane()];
        let text = write(&records);
        assert_eq!(read_records(text.as_bytes()).unwrap(), records);
    }

    #[test]
    fn escapes_markup_in_names() {
        let mut record = jane();
        record.fields.last_name = "O'Brien & <Sons>".into();
        let text = write(&[record.clone()]);
        assert!(!text.contains("<Sons>"));
        assert_eq!(read_records(text.as_bytes()).unwrap(), vec![record]);
    }

    #[test]
    fn reads_empty_root() {
        let records = read_records("<records/>".as_bytes()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn malformed_document_fails_whole_read() {
        let text = "<records><record id=\"1\"><name first=\"A\"";
        assert!(matches!(
            read_records(text.as_bytes()).unwrap_err(),
            CabinetError::Xml(_)
        ));
    }

    #[test]
    fn bad_value_fails_whole_read() {
        let good = write(&[jane()]);
        let bad = good.replace("<age>33</age>", "<age>old</age>");
        let err = read_records(bad.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("record 1"));
    }
}
