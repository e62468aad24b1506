//! # Snapshots and Interchange
//!
//! A [`Snapshot`] is an owned copy of a store's live records taken at one
//! point in time. Later mutations of the store do not affect it.
//!
//! Two interchange formats are supported, each with a writer and a reader:
//!
//! - [`csv`]: header line plus one line per record. Reading tolerates bad
//!   lines: each one is skipped and reported.
//! - [`xml`]: a `records` root with one `record` element per entry. Reading
//!   is all-or-nothing.
//!
//! Both formats write dates as `MM/dd/yyyy`. Readers return records with the
//! ids found in the document; importing them into a store assigns fresh ids.

use crate::error::Result;
use crate::model::Record;
use std::io::Write;

pub mod csv;
pub mod xml;

pub use self::csv::{ParsedRecords, RejectedLine};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<Record>,
}

impl Snapshot {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn save_to_csv<W: Write>(&self, writer: W) -> Result<()> {
        self::csv::write_records(&self.records, writer)
    }

    pub fn save_to_xml<W: Write>(&self, writer: W) -> Result<()> {
        self::xml::write_records(&self.records, writer)
    }
}

impl From<Vec<Record>> for Snapshot {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}
