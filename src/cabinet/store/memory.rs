use super::{RecordStat, RecordStore, SearchField};
use crate::error::{CabinetError, Result};
use crate::model::{parse_date, Record, RecordFields, RecordId};
use crate::validation::{RecordValidator, ValidationRules};
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

type QueryKey = (SearchField, String);

/// In-memory record store with secondary indices.
///
/// Index buckets hold ids in a `BTreeSet`, so lookups return records in
/// creation order. Find results are memoized until the next mutation.
///
/// Uses `RefCell` for the query cache since the store is single-threaded.
pub struct MemoryStore {
    records: BTreeMap<RecordId, Record>,
    first_name_index: HashMap<String, BTreeSet<RecordId>>,
    last_name_index: HashMap<String, BTreeSet<RecordId>>,
    date_of_birth_index: HashMap<NaiveDate, BTreeSet<RecordId>>,
    query_cache: RefCell<HashMap<QueryKey, Vec<Record>>>,
    next_id: RecordId,
    validator: Box<dyn RecordValidator>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Box::new(ValidationRules::default_preset().build()))
    }
}

impl MemoryStore {
    pub fn new(validator: Box<dyn RecordValidator>) -> Self {
        Self {
            records: BTreeMap::new(),
            first_name_index: HashMap::new(),
            last_name_index: HashMap::new(),
            date_of_birth_index: HashMap::new(),
            query_cache: RefCell::new(HashMap::new()),
            next_id: 1,
            validator,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of memoized find queries. Exposed for tests.
    pub fn cached_queries(&self) -> usize {
        self.query_cache.borrow().len()
    }

    fn index(&mut self, record: &Record) {
        let fields = &record.fields;
        insert_id(&mut self.first_name_index, name_key(&fields.first_name), record.id);
        insert_id(&mut self.last_name_index, name_key(&fields.last_name), record.id);
        insert_id(&mut self.date_of_birth_index, fields.date_of_birth, record.id);
    }

    fn unindex(&mut self, record: &Record) {
        let fields = &record.fields;
        remove_id(&mut self.first_name_index, &name_key(&fields.first_name), record.id);
        remove_id(&mut self.last_name_index, &name_key(&fields.last_name), record.id);
        remove_id(&mut self.date_of_birth_index, &fields.date_of_birth, record.id);
    }

    fn invalidate(&self) {
        self.query_cache.borrow_mut().clear();
    }

    fn cached_lookup<F>(&self, key: QueryKey, lookup: F) -> Vec<Record>
    where
        F: FnOnce() -> Vec<Record>,
    {
        if let Some(hit) = self.query_cache.borrow().get(&key) {
            return hit.clone();
        }
        let found = lookup();
        self.query_cache.borrow_mut().insert(key, found.clone());
        found
    }

    fn collect<K: Eq + Hash>(
        &self,
        index: &HashMap<K, BTreeSet<RecordId>>,
        key: &K,
    ) -> Vec<Record> {
        index
            .get(key)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.records.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl RecordStore for MemoryStore {
    fn create_record(&mut self, fields: &RecordFields) -> Result<RecordId> {
        self.validator.validate(fields)?;

        let id = self.next_id;
        let record = Record::new(id, fields.clone());
        self.index(&record);
        self.records.insert(id, record);
        self.next_id += 1;
        self.invalidate();
        Ok(id)
    }

    fn edit_record(&mut self, id: RecordId, fields: &RecordFields) -> Result<()> {
        let old = self
            .records
            .get(&id)
            .cloned()
            .ok_or(CabinetError::RecordNotFound(id))?;
        self.validator.validate(fields)?;

        self.unindex(&old);
        let updated = Record::new(id, fields.clone());
        self.index(&updated);
        self.records.insert(id, updated);
        self.invalidate();
        Ok(())
    }

    fn remove_record(&mut self, id: RecordId) -> Result<()> {
        let removed = self
            .records
            .remove(&id)
            .ok_or(CabinetError::RecordNotFound(id))?;
        self.unindex(&removed);
        self.invalidate();
        Ok(())
    }

    fn get_records(&self) -> Result<Vec<Record>> {
        Ok(self.records.values().cloned().collect())
    }

    fn get_stat(&self) -> Result<RecordStat> {
        Ok(RecordStat {
            total: self.records.len(),
            deleted: 0,
        })
    }

    fn find_by_first_name(&self, value: &str) -> Result<Vec<Record>> {
        let key = name_key(value);
        Ok(self.cached_lookup((SearchField::FirstName, key.clone()), || {
            self.collect(&self.first_name_index, &key)
        }))
    }

    fn find_by_last_name(&self, value: &str) -> Result<Vec<Record>> {
        let key = name_key(value);
        Ok(self.cached_lookup((SearchField::LastName, key.clone()), || {
            self.collect(&self.last_name_index, &key)
        }))
    }

    fn find_by_date_of_birth(&self, value: &str) -> Result<Vec<Record>> {
        let date = parse_date(value)?;
        Ok(self.cached_lookup((SearchField::DateOfBirth, date.to_string()), || {
            self.collect(&self.date_of_birth_index, &date)
        }))
    }

    /// Removal is physical here, so there is never anything to purge.
    fn purge(&mut self) -> Result<usize> {
        Ok(0)
    }
}

fn name_key(name: &str) -> String {
    name.to_lowercase()
}

fn insert_id<K: Eq + Hash>(index: &mut HashMap<K, BTreeSet<RecordId>>, key: K, id: RecordId) {
    index.entry(key).or_default().insert(id);
}

fn remove_id<K: Eq + Hash>(index: &mut HashMap<K, BTreeSet<RecordId>>, key: &K, id: RecordId) {
    if let Some(ids) = index.get_mut(key) {
        ids.remove(&id);
        if ids.is_empty() {
            index.remove(key);
        }
    }
}
