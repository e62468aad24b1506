//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for every
//! cabinet operation, whichever UI drives it.
//!
//! The facade normalizes inputs (textual ids, search field names, file format
//! guessed from an extension) and dispatches to `commands/*`. It holds no
//! business logic and does no printing.
//!
//! `CabinetApi<S: RecordStore>` is generic over the backend: the binary uses
//! `CabinetApi<Box<dyn RecordStore>>` built by
//! [`open_store`](crate::store::open_store), tests use
//! `CabinetApi<MemoryStore>`.

use crate::commands::{self, CmdResult, FileFormat};
use crate::error::{CabinetError, Result};
use crate::generator::RecordGenerator;
use crate::model::{RecordFields, RecordId};
use crate::query;
use crate::store::{RecordStore, SearchField};
use std::path::Path;

pub use crate::commands::{CmdMessage, MessageLevel};

pub struct CabinetApi<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> CabinetApi<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn create(&mut self, fields: RecordFields) -> Result<CmdResult> {
        commands::create::run(&mut self.store, fields)
    }

    pub fn edit(&mut self, id: &str, fields: RecordFields) -> Result<CmdResult> {
        let id = parse_id(id)?;
        commands::edit::run(&mut self.store, id, fields)
    }

    pub fn remove(&mut self, id: &str) -> Result<CmdResult> {
        let id = parse_id(id)?;
        commands::remove::run(&mut self.store, id)
    }

    pub fn list(&self) -> Result<CmdResult> {
        commands::list::run(&self.store)
    }

    pub fn find(&self, field: &str, value: &str) -> Result<CmdResult> {
        let field: SearchField = field.parse()?;
        commands::find::run(&self.store, field, value)
    }

    /// `where <field>=<value> [and|or ...]`
    pub fn delete(&mut self, query: &str) -> Result<CmdResult> {
        let predicate = query::parse_delete(query)?;
        commands::delete::run(&mut self.store, &predicate)
    }

    /// `set <field>=<value>[, ...] where ...`
    pub fn update(&mut self, query: &str) -> Result<CmdResult> {
        let query = query::parse_update(query)?;
        commands::update::run(&mut self.store, &query)
    }

    /// `[<field>[, ...]] [where ...]`
    pub fn select(&self, query: &str) -> Result<CmdResult> {
        let query = query::parse_select(query)?;
        commands::select::run(&self.store, &query)
    }

    pub fn stat(&self) -> Result<CmdResult> {
        commands::stat::run(&self.store)
    }

    pub fn purge(&mut self) -> Result<CmdResult> {
        commands::purge::run(&mut self.store)
    }

    pub fn export(
        &self,
        format: Option<FileFormat>,
        path: &Path,
        overwrite: bool,
    ) -> Result<CmdResult> {
        let format = resolve_format(format, path)?;
        commands::export::run(&self.store, format, path, overwrite)
    }

    pub fn import(&mut self, format: Option<FileFormat>, path: &Path) -> Result<CmdResult> {
        let format = resolve_format(format, path)?;
        commands::import::run(&mut self.store, format, path)
    }

    pub fn generate(
        &self,
        format: Option<FileFormat>,
        path: &Path,
        start_id: RecordId,
        count: usize,
    ) -> Result<CmdResult> {
        let format = resolve_format(format, path)?;
        let mut generator = RecordGenerator::from_entropy();
        commands::generate::run(&mut generator, format, path, start_id, count)
    }
}

pub fn parse_id(input: &str) -> Result<RecordId> {
    let trimmed = input.trim().trim_start_matches('#');
    match trimmed.parse::<RecordId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CabinetError::Api(format!(
            "'{}' is not a valid record id",
            input.trim()
        ))),
    }
}

fn resolve_format(explicit: Option<FileFormat>, path: &Path) -> Result<FileFormat> {
    explicit
        .or_else(|| FileFormat::from_path(path))
        .ok_or_else(|| {
            CabinetError::Api(format!(
                "can't tell the format of {}; pass --format csv or --format xml",
                path.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tempfile::TempDir;

    fn api() -> CabinetApi<MemoryStore> {
        CabinetApi::new(MemoryStore::default())
    }

    fn jane() -> RecordFields {
        RecordFields::parse("Jane", "Doe", "1990-05-01", "33", "50000.00", "F").unwrap()
    }

    #[test]
    fn parse_id_accepts_hash_prefix() {
        assert_eq!(parse_id("#12").unwrap(), 12);
        assert_eq!(parse_id(" 3 ").unwrap(), 3);
        assert!(parse_id("0").is_err());
        assert!(parse_id("abc").is_err());
    }

    #[test]
    fn create_edit_remove_flow() {
        let mut api = api();
        api.create(jane()).unwrap();
        let mut fields = jane();
        fields.last_name = "Smith".into();
        api.edit("1", fields).unwrap();

        let found = api.find("lastname", "smith").unwrap();
        assert_eq!(found.listed_records.len(), 1);

        api.remove("#1").unwrap();
        assert!(api.list().unwrap().listed_records.is_empty());
    }

    #[test]
    fn find_rejects_unknown_field() {
        assert!(api().find("salary", "1").is_err());
    }

    #[test]
    fn export_guesses_format_from_extension() {
        let dir = TempDir::new().unwrap();
        let mut api = api();
        api.create(jane()).unwrap();

        let path = dir.path().join("out.xml");
        api.export(None, &path, false).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("<record id=\"1\">"));

        let err = api.export(None, &dir.path().join("out.dat"), false).unwrap_err();
        assert!(err.to_string().contains("--format"));
    }

    #[test]
    fn export_then_import_reproduces_fields() {
        let dir = TempDir::new().unwrap();
        let mut source = api();
        source.create(jane()).unwrap();
        let mut other = jane();
        other.first_name = "Mary".into();
        source.create(other).unwrap();

        let path = dir.path().join("out.csv");
        source.export(None, &path, false).unwrap();

        let mut target = api();
        target.import(None, &path).unwrap();

        let fields = |api: &CabinetApi<MemoryStore>| -> Vec<RecordFields> {
            api.list()
                .unwrap()
                .listed_records
                .into_iter()
                .map(|r| r.fields)
                .collect()
        };
        assert_eq!(fields(&source), fields(&target));
    }

    #[test]
    fn query_commands_round_through_the_facade() {
        let mut api = api();
        api.create(jane()).unwrap();
        let mut john = jane();
        john.first_name = "John".into();
        api.create(john).unwrap();

        api.update("set age=40 where firstname=John").unwrap();
        let selected = api.select("id, age where age=40").unwrap();
        assert_eq!(selected.listed_records.len(), 1);
        assert_eq!(selected.listed_records[0].id, 2);

        let deleted = api.delete("where lastname='Doe'").unwrap();
        assert_eq!(deleted.affected_records.len(), 2);
        assert!(api.store().is_empty());
    }

    #[test]
    fn malformed_query_is_an_api_error() {
        let mut api = api();
        let err = api.delete("lastname=Doe").unwrap_err();
        assert!(matches!(err, CabinetError::Api(_)));
    }
}
