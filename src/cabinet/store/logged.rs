use super::{RecordStat, RecordStore};
use crate::error::Result;
use crate::model::{format_date, Record, RecordFields, RecordId};
use crate::snapshot::Snapshot;
use std::fmt::Display;
use tracing::info;

/// Emits an audit event before and after every call on the wrapped store.
///
/// Events go to the `cabinet::audit` target; the binary routes that target to
/// a log file when `--use-logger` is set.
pub struct LoggedStore<S> {
    inner: S,
}

impl<S: RecordStore> LoggedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn call<T, F>(method: &str, args: &str, run: F, show: impl Fn(&T) -> String) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        info!(target: "cabinet::audit", "Calling {}() with {}", method, args);
        match run() {
            Ok(value) => {
                info!(target: "cabinet::audit", "{}() returned {}", method, show(&value));
                Ok(value)
            }
            Err(e) => {
                info!(target: "cabinet::audit", "{}() failed: {}", method, e);
                Err(e)
            }
        }
    }
}

fn describe(fields: &RecordFields) -> String {
    format!(
        "FirstName = '{}', LastName = '{}', DateOfBirth = '{}', Age = '{}', Salary = '{}', Gender = '{}'",
        fields.first_name,
        fields.last_name,
        format_date(fields.date_of_birth),
        fields.age,
        fields.salary,
        fields.gender
    )
}

fn quoted(value: &impl Display) -> String {
    format!("'{}'", value)
}

fn unit(_: &()) -> String {
    "successfully".to_string()
}

#[allow(clippy::ptr_arg)]
fn count(records: &Vec<Record>) -> String {
    format!("{} record(s)", records.len())
}

impl<S: RecordStore> RecordStore for LoggedStore<S> {
    fn create_record(&mut self, fields: &RecordFields) -> Result<RecordId> {
        let inner = &mut self.inner;
        Self::call(
            "create_record",
            &describe(fields),
            || inner.create_record(fields),
            quoted,
        )
    }

    fn edit_record(&mut self, id: RecordId, fields: &RecordFields) -> Result<()> {
        let inner = &mut self.inner;
        let args = format!("Id = '{}', {}", id, describe(fields));
        Self::call("edit_record", &args, || inner.edit_record(id, fields), unit)
    }

    fn remove_record(&mut self, id: RecordId) -> Result<()> {
        let inner = &mut self.inner;
        let args = format!("Id = '{}'", id);
        Self::call("remove_record", &args, || inner.remove_record(id), unit)
    }

    fn get_records(&self) -> Result<Vec<Record>> {
        Self::call("get_records", "no arguments", || self.inner.get_records(), count)
    }

    fn get_stat(&self) -> Result<RecordStat> {
        Self::call("get_stat", "no arguments", || self.inner.get_stat(), quoted)
    }

    fn find_by_first_name(&self, value: &str) -> Result<Vec<Record>> {
        let args = format!("FirstName = '{}'", value);
        Self::call(
            "find_by_first_name",
            &args,
            || self.inner.find_by_first_name(value),
            count,
        )
    }

    fn find_by_last_name(&self, value: &str) -> Result<Vec<Record>> {
        let args = format!("LastName = '{}'", value);
        Self::call(
            "find_by_last_name",
            &args,
            || self.inner.find_by_last_name(value),
            count,
        )
    }

    fn find_by_date_of_birth(&self, value: &str) -> Result<Vec<Record>> {
        let args = format!("DateOfBirth = '{}'", value);
        Self::call(
            "find_by_date_of_birth",
            &args,
            || self.inner.find_by_date_of_birth(value),
            count,
        )
    }

    fn make_snapshot(&self) -> Result<Snapshot> {
        Self::call(
            "make_snapshot",
            "no arguments",
            || self.inner.make_snapshot(),
            |s: &Snapshot| format!("{} record(s)", s.len()),
        )
    }

    fn purge(&mut self) -> Result<usize> {
        let inner = &mut self.inner;
        Self::call("purge", "no arguments", || inner.purge(), quoted)
    }
}
