use crate::model::RecordFields;
use crate::store::fs::FileStore;
use std::path::PathBuf;
use tempfile::TempDir;

/// A slot file in a fresh temp directory.
pub struct TestEnv {
    // Kept so the directory lives as long as the store
    pub _temp_dir: TempDir,
    pub store: FileStore,
    pub data_file: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let data_file = temp_dir.path().join("cabinet.db");
        let store = FileStore::open_default(&data_file).expect("failed to open slot file");
        Self {
            _temp_dir: temp_dir,
            store,
            data_file,
        }
    }

    /// Reopens the slot file, as a new process would.
    pub fn reopen(&mut self) {
        self.store = FileStore::open_default(&self.data_file).expect("failed to reopen slot file");
    }
}

/// Valid under both presets.
pub fn jane() -> RecordFields {
    fields("Jane", "Doe", "1990-05-01")
}

/// Fields valid under the default preset, varying only the lookup keys.
pub fn fields(first: &str, last: &str, date_of_birth: &str) -> RecordFields {
    RecordFields::parse(first, last, date_of_birth, "33", "50000.00", "F")
        .expect("test fields must parse")
}
