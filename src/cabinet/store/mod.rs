//! # Storage Layer
//!
//! Every backend implements [`RecordStore`], so the command layer never knows
//! whether records live in memory or in a slot file.
//!
//! ## Implementations
//!
//! - [`memory::MemoryStore`]: records in an ordered map with case-insensitive
//!   name indices, a date index, and a find-query cache.
//! - [`fs::FileStore`]: one fixed 278-byte slot per record (see [`slot`]).
//!   Removal sets a tombstone bit; [`RecordStore::purge`] compacts the file.
//!
//! ## Decorators
//!
//! [`logged::LoggedStore`] and [`timed::TimedStore`] wrap any store and forward
//! every call unchanged, emitting `tracing` events around it. They nest in
//! either order. [`open_store`] assembles the configured backend and wrappers.
//!
//! ## Validation
//!
//! Both backends own a [`RecordValidator`] and run it in `create_record` and
//! `edit_record` before any state changes. A rejected call leaves the store
//! exactly as it was.
//!
//! ## Identity
//!
//! Ids come from a counter owned by the store instance and are never handed
//! out twice, not even after a record is removed or purged.

use crate::config::{CabinetConfig, StorageKind};
use crate::error::Result;
use crate::model::{Record, RecordFields, RecordId};
use crate::snapshot::Snapshot;
use crate::validation::{RecordValidator, ValidationRules};
use std::fmt;
use std::str::FromStr;

pub mod fs;
pub mod logged;
pub mod memory;
pub mod slot;
pub mod timed;

pub use fs::FileStore;
pub use logged::LoggedStore;
pub use memory::MemoryStore;
pub use timed::TimedStore;

/// Live and tombstoned record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordStat {
    pub total: usize,
    pub deleted: usize,
}

impl fmt::Display for RecordStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} record(s), {} deleted", self.total, self.deleted)
    }
}

/// A field that records can be looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    FirstName,
    LastName,
    DateOfBirth,
}

impl SearchField {
    pub fn name(self) -> &'static str {
        match self {
            SearchField::FirstName => "firstname",
            SearchField::LastName => "lastname",
            SearchField::DateOfBirth => "dateofbirth",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchField {
    type Err = crate::error::CabinetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "firstname" => Ok(SearchField::FirstName),
            "lastname" => Ok(SearchField::LastName),
            "dateofbirth" | "dob" => Ok(SearchField::DateOfBirth),
            other => Err(crate::error::CabinetError::Format(format!(
                "unknown search field '{}'",
                other
            ))),
        }
    }
}

/// The record store contract shared by both backends and the decorators.
pub trait RecordStore {
    /// Validate, assign the next id, and store the record.
    fn create_record(&mut self, fields: &RecordFields) -> Result<RecordId>;

    /// Replace every field of an existing record.
    fn edit_record(&mut self, id: RecordId, fields: &RecordFields) -> Result<()>;

    fn remove_record(&mut self, id: RecordId) -> Result<()>;

    /// All live records in creation order.
    fn get_records(&self) -> Result<Vec<Record>>;

    fn get_stat(&self) -> Result<RecordStat>;

    /// Case-insensitive exact match.
    fn find_by_first_name(&self, value: &str) -> Result<Vec<Record>>;

    /// Case-insensitive exact match.
    fn find_by_last_name(&self, value: &str) -> Result<Vec<Record>>;

    /// `value` is `yyyy-mm-dd` or `MM/dd/yyyy`.
    fn find_by_date_of_birth(&self, value: &str) -> Result<Vec<Record>>;

    fn make_snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot::new(self.get_records()?))
    }

    /// Physically drop removed records. Returns how many were dropped.
    fn purge(&mut self) -> Result<usize>;

    fn find_by(&self, field: SearchField, value: &str) -> Result<Vec<Record>> {
        match field {
            SearchField::FirstName => self.find_by_first_name(value),
            SearchField::LastName => self.find_by_last_name(value),
            SearchField::DateOfBirth => self.find_by_date_of_birth(value),
        }
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn create_record(&mut self, fields: &RecordFields) -> Result<RecordId> {
        (**self).create_record(fields)
    }

    fn edit_record(&mut self, id: RecordId, fields: &RecordFields) -> Result<()> {
        (**self).edit_record(id, fields)
    }

    fn remove_record(&mut self, id: RecordId) -> Result<()> {
        (**self).remove_record(id)
    }

    fn get_records(&self) -> Result<Vec<Record>> {
        (**self).get_records()
    }

    fn get_stat(&self) -> Result<RecordStat> {
        (**self).get_stat()
    }

    fn find_by_first_name(&self, value: &str) -> Result<Vec<Record>> {
        (**self).find_by_first_name(value)
    }

    fn find_by_last_name(&self, value: &str) -> Result<Vec<Record>> {
        (**self).find_by_last_name(value)
    }

    fn find_by_date_of_birth(&self, value: &str) -> Result<Vec<Record>> {
        (**self).find_by_date_of_birth(value)
    }

    fn make_snapshot(&self) -> Result<Snapshot> {
        (**self).make_snapshot()
    }

    fn purge(&mut self) -> Result<usize> {
        (**self).purge()
    }
}

/// Builds the validator selected by the configuration.
pub fn build_validator(config: &CabinetConfig) -> Result<Box<dyn RecordValidator>> {
    let rules = match &config.rules_file {
        Some(path) => ValidationRules::load(path, config.validation_rules)?,
        None => ValidationRules::preset(config.validation_rules),
    };
    Ok(Box::new(rules.build()))
}

/// Opens the configured backend and wraps it in the enabled decorators.
///
/// The stopwatch sits closest to the backend so logged durations are not
/// inflated by the logging itself.
pub fn open_store(config: &CabinetConfig) -> Result<Box<dyn RecordStore>> {
    let validator = build_validator(config)?;
    let mut store: Box<dyn RecordStore> = match config.storage {
        StorageKind::Memory => Box::new(MemoryStore::new(validator)),
        StorageKind::File => Box::new(FileStore::open(config.data_path(), validator)?),
    };
    if config.use_stopwatch {
        store = Box::new(TimedStore::new(store));
    }
    if config.use_logger {
        store = Box::new(LoggedStore::new(store));
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_field_accepts_cli_spellings() {
        assert_eq!("firstname".parse::<SearchField>().unwrap(), SearchField::FirstName);
        assert_eq!("last-name".parse::<SearchField>().unwrap(), SearchField::LastName);
        assert_eq!("DateOfBirth".parse::<SearchField>().unwrap(), SearchField::DateOfBirth);
        assert!("salary".parse::<SearchField>().is_err());
    }

    #[test]
    fn open_store_memory_with_decorators() {
        let config = CabinetConfig {
            storage: StorageKind::Memory,
            use_stopwatch: true,
            use_logger: true,
            ..CabinetConfig::default()
        };
        let mut store = open_store(&config).unwrap();
        let fields = RecordFields::parse("Jane", "Doe", "1990-05-01", "33", "50000.00", "F").unwrap();
        assert_eq!(store.create_record(&fields).unwrap(), 1);
        assert_eq!(store.get_stat().unwrap(), RecordStat { total: 1, deleted: 0 });
    }

    #[test]
    fn open_store_uses_configured_rule_set() {
        let config = CabinetConfig {
            storage: StorageKind::Memory,
            validation_rules: crate::validation::RuleSet::Custom,
            ..CabinetConfig::default()
        };
        let mut store = open_store(&config).unwrap();
        // "Al" passes the default preset but not the custom one
        let fields = RecordFields::parse("Al", "Smith", "1970-01-01", "50", "5000", "M").unwrap();
        let err = store.create_record(&fields).unwrap_err();
        assert!(matches!(err, crate::error::CabinetError::Validation(_)));
    }
}
