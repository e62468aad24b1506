use super::{RecordStat, RecordStore};
use crate::error::Result;
use crate::model::{Record, RecordFields, RecordId};
use crate::snapshot::Snapshot;
use std::cell::Cell;
use std::time::{Duration, Instant};
use tracing::info;

/// Measures the wall time of every call on the wrapped store.
///
/// Each measurement is emitted on the `cabinet::meter` target and kept as the
/// most recent reading.
pub struct TimedStore<S> {
    inner: S,
    last: Cell<Option<(&'static str, Duration)>>,
}

impl<S: RecordStore> TimedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            last: Cell::new(None),
        }
    }

    /// Method name and duration of the latest call.
    pub fn last_elapsed(&self) -> Option<(&'static str, Duration)> {
        self.last.get()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn measure<T>(
        last: &Cell<Option<(&'static str, Duration)>>,
        method: &'static str,
        run: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let start = Instant::now();
        let result = run();
        let elapsed = start.elapsed();
        last.set(Some((method, elapsed)));
        info!(
            target: "cabinet::meter",
            micros = elapsed.as_micros() as u64,
            "{} method execution duration is {:?}",
            method,
            elapsed
        );
        result
    }
}

impl<S: RecordStore> RecordStore for TimedStore<S> {
    fn create_record(&mut self, fields: &RecordFields) -> Result<RecordId> {
        let inner = &mut self.inner;
        Self::measure(&self.last, "create_record", || inner.create_record(fields))
    }

    fn edit_record(&mut self, id: RecordId, fields: &RecordFields) -> Result<()> {
        let inner = &mut self.inner;
        Self::measure(&self.last, "edit_record", || inner.edit_record(id, fields))
    }

    fn remove_record(&mut self, id: RecordId) -> Result<()> {
        let inner = &mut self.inner;
        Self::measure(&self.last, "remove_record", || inner.remove_record(id))
    }

    fn get_records(&self) -> Result<Vec<Record>> {
        Self::measure(&self.last, "get_records", || self.inner.get_records())
    }

    fn get_stat(&self) -> Result<RecordStat> {
        Self::measure(&self.last, "get_stat", || self.inner.get_stat())
    }

    fn find_by_first_name(&self, value: &str) -> Result<Vec<Record>> {
        Self::measure(&self.last, "find_by_first_name", || {
            self.inner.find_by_first_name(value)
        })
    }

    fn find_by_last_name(&self, value: &str) -> Result<Vec<Record>> {
        Self::measure(&self.last, "find_by_last_name", || {
            self.inner.find_by_last_name(value)
        })
    }

    fn find_by_date_of_birth(&self, value: &str) -> Result<Vec<Record>> {
        Self::measure(&self.last, "find_by_date_of_birth", || {
            self.inner.find_by_date_of_birth(value)
        })
    }

    fn make_snapshot(&self) -> Result<Snapshot> {
        Self::measure(&self.last, "make_snapshot", || self.inner.make_snapshot())
    }

    fn purge(&mut self) -> Result<usize> {
        let inner = &mut self.inner;
        Self::measure(&self.last, "purge", || inner.purge())
    }
}
