use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::RecordStore;

pub fn run<S: RecordStore>(store: &S) -> Result<CmdResult> {
    let records = store.get_records()?;
    let mut result = CmdResult::default();
    if records.is_empty() {
        result.add_message(CmdMessage::info("The cabinet is empty."));
    }
    Ok(result.with_listed_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordFields;
    use crate::store::MemoryStore;

    #[test]
    fn lists_in_creation_order() {
        let mut store = MemoryStore::default();
        for name in ["Zoe", "Adam"] {
            let fields = RecordFields::parse(name, "Doe", "1990-05-01", "33", "1", "F").unwrap();
            store.create_record(&fields).unwrap();
        }
        let result = run(&store).unwrap();
        let names: Vec<_> = result
            .listed_records
            .iter()
            .map(|r| r.fields.first_name.as_str())
            .collect();
        assert_eq!(names, vec!["Zoe", "Adam"]);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn empty_store_says_so() {
        let result = run(&MemoryStore::default()).unwrap();
        assert!(result.listed_records.is_empty());
        assert_eq!(result.messages.len(), 1);
    }
}
