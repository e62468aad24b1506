use crate::error::{CabinetError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Store-assigned record identifier. Always positive.
pub type RecordId = u32;

/// Date format used by CSV and XML interchange.
pub const INTERCHANGE_DATE_FORMAT: &str = "%m/%d/%Y";

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// The user-supplied part of a record: everything except the id.
///
/// This is what `create_record` and `edit_record` receive, and what the
/// validators inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub age: i16,
    pub salary: Decimal,
    pub gender: char,
}

impl RecordFields {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
        age: i16,
        salary: Decimal,
        gender: char,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth,
            age,
            salary,
            gender,
        }
    }

    /// Parses the raw textual form used by the CLI and the CSV reader.
    /// Names are trimmed.
    pub fn parse(
        first_name: &str,
        last_name: &str,
        date_of_birth: &str,
        age: &str,
        salary: &str,
        gender: &str,
    ) -> Result<Self> {
        Ok(Self {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            date_of_birth: parse_date(date_of_birth)?,
            age: parse_age(age)?,
            salary: parse_salary(salary)?,
            gender: parse_gender(gender)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub fields: RecordFields,
}

impl Record {
    pub fn new(id: RecordId, fields: RecordFields) -> Self {
        Self { id, fields }
    }
}

/// Accepts `yyyy-mm-dd` and `MM/dd/yyyy`.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, ISO_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(input, INTERCHANGE_DATE_FORMAT))
        .map_err(|_| CabinetError::Format(format!("invalid date '{}'", input)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(INTERCHANGE_DATE_FORMAT).to_string()
}

pub fn parse_age(input: &str) -> Result<i16> {
    input
        .trim()
        .parse()
        .map_err(|_| CabinetError::Format(format!("invalid age '{}'", input.trim())))
}

pub fn parse_salary(input: &str) -> Result<Decimal> {
    Decimal::from_str(input.trim())
        .map_err(|_| CabinetError::Format(format!("invalid salary '{}'", input.trim())))
}

pub fn parse_gender(input: &str) -> Result<char> {
    let mut chars = input.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(CabinetError::Format(format!(
            "gender must be a single character, got '{}'",
            input.trim()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_date_formats() {
        let expected = NaiveDate::from_ymd_opt(1990, 5, 1).unwrap();
        assert_eq!(parse_date("1990-05-01").unwrap(), expected);
        assert_eq!(parse_date("05/01/1990").unwrap(), expected);
        assert_eq!(parse_date(" 05/01/1990 ").unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_date_format() {
        let err = parse_date("1st of May").unwrap_err();
        assert!(matches!(err, CabinetError::Format(_)));
    }

    #[test]
    fn formats_interchange_date() {
        let date = NaiveDate::from_ymd_opt(2001, 12, 9).unwrap();
        assert_eq!(format_date(date), "12/09/2001");
    }

    #[test]
    fn salary_keeps_scale() {
        let salary = parse_salary("50000.00").unwrap();
        assert_eq!(salary.to_string(), "50000.00");
    }

    #[test]
    fn gender_must_be_one_char() {
        assert_eq!(parse_gender("F").unwrap(), 'F');
        assert!(parse_gender("").is_err());
        assert!(parse_gender("FM").is_err());
    }

    #[test]
    fn parse_fields_reports_bad_age() {
        let err = RecordFields::parse("Jane", "Doe", "1990-05-01", "old", "1", "F").unwrap_err();
        assert!(err.to_string().contains("invalid age"));
    }

    #[test]
    fn parse_fields_trims_names() {
        let f = RecordFields::parse(" Jane ", "Doe\t", "1990-05-01", "33", "1", "F").unwrap();
        assert_eq!(f.first_name, "Jane");
        assert_eq!(f.last_name, "Doe");
    }
}
