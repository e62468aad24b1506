//! # Command Layer
//!
//! Each user-facing operation lives in its own submodule as a plain function
//! over a [`RecordStore`](crate::store::RecordStore). Commands are UI-agnostic:
//! they never print, prompt, or exit. They return a [`CmdResult`] carrying the
//! records involved and leveled messages, and the caller decides how to render
//! them.
//!
//! Failures that concern the whole call (a missing record, an unreadable
//! file) are returned as `Err`. Failures that concern one item of a batch,
//! such as a single bad line during import, become warning messages and the
//! batch continues.
//!
//! ## Command Modules
//!
//! - [`create`], [`edit`], [`remove`]: single-record mutations
//! - [`list`], [`find`]: queries
//! - [`delete`], [`update`], [`select`]: predicate-driven batch operations
//! - [`stat`], [`purge`]: file maintenance
//! - [`export`], [`import`]: CSV/XML interchange
//! - [`generate`]: random test data written straight to a file

use crate::error::{CabinetError, Result};
use crate::model::Record;
use crate::query::Column;
use crate::store::RecordStat;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub mod create;
pub mod delete;
pub mod edit;
pub mod export;
pub mod find;
pub mod generate;
pub mod import;
pub mod list;
pub mod purge;
pub mod remove;
pub mod select;
pub mod stat;
pub mod update;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Records created or changed by the command.
    pub affected_records: Vec<Record>,
    /// Records to display.
    pub listed_records: Vec<Record>,
    pub stat: Option<RecordStat>,
    /// Projection requested by `select`; empty means the default table.
    pub columns: Vec<Column>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_records(mut self, records: Vec<Record>) -> Self {
        self.affected_records = records;
        self
    }

    pub fn with_listed_records(mut self, records: Vec<Record>) -> Self {
        self.listed_records = records;
        self
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_stat(mut self, stat: RecordStat) -> Self {
        self.stat = Some(stat);
        self
    }

    pub fn has_warnings(&self) -> bool {
        self.messages
            .iter()
            .any(|m| matches!(m.level, MessageLevel::Warning | MessageLevel::Error))
    }
}

/// Interchange file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xml,
}

impl FileFormat {
    /// Guesses the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Csv => f.write_str("csv"),
            FileFormat::Xml => f.write_str("xml"),
        }
    }
}

impl FromStr for FileFormat {
    type Err = CabinetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xml" => Ok(FileFormat::Xml),
            other => Err(CabinetError::Api(format!(
                "unknown file format '{}' (expected 'csv' or 'xml')",
                other
            ))),
        }
    }
}
