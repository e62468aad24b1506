use cabinet::api::CabinetApi;
use cabinet::commands::FileFormat;
use cabinet::generator::RecordGenerator;
use cabinet::model::RecordFields;
use cabinet::store::{FileStore, MemoryStore, RecordStore};
use std::fs;
use std::path::Path;

fn sample_store() -> MemoryStore {
    let mut store = MemoryStore::default();
    let rows = [
        ("Jane", "Doe", "1990-05-01", "33", "50000.00", "F"),
        ("John", "O'Hara, Jr", "1985-01-15", "39", "1234.5", "M"),
        ("Zoë", "\"Quoted\"", "1979-11-30", "44", "0", "F"),
    ];
    for (first, last, dob, age, salary, gender) in rows {
        let fields = RecordFields::parse(first, last, dob, age, salary, gender).unwrap();
        store.create_record(&fields).unwrap();
    }
    store
}

fn field_sets(store: &impl RecordStore) -> Vec<RecordFields> {
    store
        .get_records()
        .unwrap()
        .into_iter()
        .map(|r| r.fields)
        .collect()
}

fn round_trip(format: FileFormat, path: &Path) -> Vec<RecordFields> {
    let source = CabinetApi::new(sample_store());
    source.export(Some(format), path, false).unwrap();

    let mut target = CabinetApi::new(MemoryStore::default());
    let result = target.import(Some(format), path).unwrap();
    assert!(!result.has_warnings(), "{:?}", result.messages);
    assert_eq!(result.affected_records.len(), 3);

    let imported = field_sets(target.store());
    assert_eq!(imported, field_sets(source.store()));
    imported
}

#[test]
fn csv_round_trip_preserves_fields() {
    let dir = tempfile::tempdir().unwrap();
    round_trip(FileFormat::Csv, &dir.path().join("records.csv"));
}

#[test]
fn xml_round_trip_preserves_fields() {
    let dir = tempfile::tempdir().unwrap();
    round_trip(FileFormat::Xml, &dir.path().join("records.xml"));
}

#[test]
fn xml_and_csv_import_agree() {
    let dir = tempfile::tempdir().unwrap();
    let via_csv = round_trip(FileFormat::Csv, &dir.path().join("a.csv"));
    let via_xml = round_trip(FileFormat::Xml, &dir.path().join("a.xml"));
    assert_eq!(via_csv, via_xml);
}

#[test]
fn import_into_file_store_assigns_new_ids() {
    let dir = tempfile::tempdir().unwrap();
    let export_path = dir.path().join("records.csv");
    CabinetApi::new(sample_store())
        .export(None, &export_path, false)
        .unwrap();

    let mut store = FileStore::open_default(dir.path().join("cabinet.db")).unwrap();
    store
        .create_record(&RecordFields::parse("Ann", "Lee", "1970-02-02", "54", "10", "F").unwrap())
        .unwrap();

    let mut api = CabinetApi::new(store);
    api.import(None, &export_path).unwrap();

    let ids: Vec<u32> = api.store().get_records().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn bad_csv_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.csv");
    fs::write(
        &path,
        "Id,FirstName,LastName,DateOfBirth,Age,Salary,Gender\n\
         1,Jane,Doe,05/01/1990,33,50000.00,F\n\
         2,John,Roe,not-a-date,39,100,M\n\
         3,J,Short,05/01/1990,33,100,M\n\
         4,Mary,Poe,11/30/1979,44,100,F\n",
    )
    .unwrap();

    let mut api = CabinetApi::new(MemoryStore::default());
    let result = api.import(Some(FileFormat::Csv), &path).unwrap();

    assert!(result.has_warnings());
    let warnings: Vec<&str> = result
        .messages
        .iter()
        .map(|m| m.content.as_str())
        .filter(|m| m.contains("skipped"))
        .collect();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].starts_with("Line 3 skipped"));
    assert!(warnings[1].starts_with("Record #3 skipped"));

    let names: Vec<String> = field_sets(api.store())
        .into_iter()
        .map(|f| f.first_name)
        .collect();
    assert_eq!(names, vec!["Jane", "Mary"]);
}

#[test]
fn malformed_xml_imports_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.xml");
    fs::write(
        &path,
        r#"<?xml version="1.0" encoding="utf-8"?>
<records>
  <record id="1">
    <name first="Jane" last="Doe"/>
    <dateOfBirth>05/01/1990</dateOfBirth>
    <age>33</age>
    <salary>50000.00</salary>
    <gender>F</gender>
  </record>
  <record id="2">
    <name first="John" last="Roe"/>
    <dateOfBirth>yesterday</dateOfBirth>
    <age>39</age>
    <salary>100</salary>
    <gender>M</gender>
  </record>
</records>
"#,
    )
    .unwrap();

    let mut api = CabinetApi::new(MemoryStore::default());
    assert!(api.import(Some(FileFormat::Xml), &path).is_err());
    assert!(api.store().is_empty());
}

#[test]
fn generated_records_import_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    for format in [FileFormat::Csv, FileFormat::Xml] {
        let path = dir.path().join(format!("generated.{}", format));
        let records = RecordGenerator::seeded(7).generate(100, 25).unwrap();
        let file = fs::File::create(&path).unwrap();
        let snapshot = cabinet::snapshot::Snapshot::new(records);
        match format {
            FileFormat::Csv => snapshot.save_to_csv(file).unwrap(),
            FileFormat::Xml => snapshot.save_to_xml(file).unwrap(),
        }

        let mut api = CabinetApi::new(MemoryStore::default());
        let result = api.import(Some(format), &path).unwrap();
        assert!(!result.has_warnings(), "{:?}", result.messages);
        assert_eq!(api.store().len(), 25);
    }
}
