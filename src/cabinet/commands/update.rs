use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Record;
use crate::query::UpdateQuery;
use crate::store::RecordStore;
use tracing::warn;

/// Applies the `set` assignments to every record matching the `where` part.
///
/// Each record is edited on its own. A record whose new field set the store
/// rejects is reported and left unchanged; the rest are still updated.
pub fn run<S: RecordStore>(store: &mut S, query: &UpdateQuery) -> Result<CmdResult> {
    let matched = query.predicate.select(&*store)?;

    let mut result = CmdResult::default();
    if matched.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "No records match {}.",
            query.predicate
        )));
        return Ok(result);
    }

    let mut updated = Vec::with_capacity(matched.len());
    for record in matched {
        let mut fields = record.fields;
        for assignment in &query.assignments {
            assignment.apply(&mut fields);
        }
        match store.edit_record(record.id, &fields) {
            Ok(()) => updated.push(Record::new(record.id, fields)),
            Err(e) if e.is_recoverable() => {
                warn!(id = record.id, error = %e, "update rejected record");
                result.add_message(CmdMessage::warning(format!(
                    "Record #{} skipped: {}",
                    record.id, e
                )));
            }
            Err(e) => return Err(e),
        }
    }

    result.add_message(CmdMessage::success(format!(
        "{} record(s) updated.",
        updated.len()
    )));
    Ok(result.with_affected_records(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse_update;
    use crate::store::MemoryStore;
    use crate::test_utils::fields;
    use rust_decimal::Decimal;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::default();
        store.create_record(&fields("Jane", "Doe", "1990-05-01")).unwrap();
        store.create_record(&fields("John", "Doe", "1985-01-15")).unwrap();
        store.create_record(&fields("Mary", "Roe", "1979-11-30")).unwrap();
        store
    }

    #[test]
    fn updates_matching_records_only() {
        let mut store = store();
        let query = parse_update("set salary=1200.50, gender=M where lastname=Doe").unwrap();
        let result = run(&mut store, &query).unwrap();

        assert_eq!(result.messages[0].content, "2 record(s) updated.");
        let records = store.get_records().unwrap();
        assert_eq!(records[0].fields.salary, Decimal::new(120050, 2));
        assert_eq!(records[1].fields.gender, 'M');
        assert_eq!(records[2].fields.gender, 'F');
        assert_eq!(records[2].fields.salary, Decimal::new(5000000, 2));
    }

    #[test]
    fn renaming_moves_the_index() {
        let mut store = store();
        let query = parse_update("set firstname='Janet' where id=1").unwrap();
        run(&mut store, &query).unwrap();

        assert!(store.find_by_first_name("jane").unwrap().is_empty());
        assert_eq!(store.find_by_first_name("JANET").unwrap()[0].id, 1);
    }

    #[test]
    fn invalid_result_is_skipped_with_warning() {
        let mut store = store();
        let query = parse_update("set firstname=J where lastname=Roe").unwrap();
        let result = run(&mut store, &query).unwrap();

        assert!(result.has_warnings());
        assert!(result.messages[0].content.starts_with("Record #3 skipped:"));
        assert_eq!(result.messages[1].content, "0 record(s) updated.");
        assert_eq!(store.get_records().unwrap()[2].fields.first_name, "Mary");
    }

    #[test]
    fn no_match_is_reported() {
        let mut store = store();
        let query = parse_update("set age=40 where firstname=Zed").unwrap();
        let result = run(&mut store, &query).unwrap();
        assert_eq!(result.messages[0].content, "No records match firstname='Zed'.");
    }
}
