use super::slot::{self, Slot, SlotHeader, SlotStatus, HEADER_SIZE, SLOT_SIZE};
use super::{RecordStat, RecordStore};
use crate::error::{CabinetError, Result};
use crate::model::{parse_date, Record, RecordFields, RecordId};
use crate::validation::{RecordValidator, ValidationRules};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Slot-file record store.
///
/// The file has no header: slot `n` starts at byte `n * SLOT_SIZE`. Reads take
/// `&self` and seek through `&File`; every scan starts from offset zero.
pub struct FileStore {
    path: PathBuf,
    file: File,
    next_id: RecordId,
    validator: Box<dyn RecordValidator>,
}

impl FileStore {
    /// Opens (or creates) the slot file at `path`.
    pub fn open<P: AsRef<Path>>(path: P, validator: Box<dyn RecordValidator>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(CabinetError::Io)?;
        }
        let file = open_rw(&path)?;

        let mut store = Self {
            path,
            file,
            next_id: 1,
            validator,
        };

        let len = store.file_len()?;
        if len % SLOT_SIZE as u64 != 0 {
            warn!(
                path = %store.path.display(),
                trailing = len % SLOT_SIZE as u64,
                "slot file ends with a partial slot; it will be overwritten by the next create"
            );
        }

        let slot_count = store.slot_count()?;
        let highest = store
            .scan_headers()?
            .iter()
            .filter_map(|(_, header)| header.record_id())
            .max()
            .unwrap_or(0);
        store.next_id = (slot_count as RecordId).max(highest) + 1;

        debug!(
            path = %store.path.display(),
            slots = slot_count,
            next_id = store.next_id,
            "opened slot file"
        );
        Ok(store)
    }

    /// Opens with the default validation preset.
    pub fn open_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, Box::new(ValidationRules::default_preset().build()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_len(&self) -> Result<u64> {
        Ok(self.file.metadata().map_err(CabinetError::Io)?.len())
    }

    fn slot_count(&self) -> Result<u64> {
        Ok(self.file_len()? / SLOT_SIZE as u64)
    }

    fn reader(&self) -> Result<BufReader<&File>> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(0)).map_err(CabinetError::Io)?;
        Ok(BufReader::new(file))
    }

    /// Reads status and id of every slot, skipping the record bodies.
    fn scan_headers(&self) -> Result<Vec<(u64, SlotHeader)>> {
        let count = self.slot_count()?;
        let mut reader = self.reader()?;
        let mut headers = Vec::with_capacity(count as usize);
        let mut buf = [0u8; HEADER_SIZE];
        for n in 0..count {
            reader.read_exact(&mut buf).map_err(CabinetError::Io)?;
            headers.push((n * SLOT_SIZE as u64, slot::decode_header(&buf)));
            if n + 1 < count {
                reader
                    .seek_relative((SLOT_SIZE - HEADER_SIZE) as i64)
                    .map_err(CabinetError::Io)?;
            }
        }
        Ok(headers)
    }

    /// Calls `visit` with the offset and bytes of every whole slot.
    fn scan_slots<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(u64, &Slot) -> Result<()>,
    {
        let count = self.slot_count()?;
        let mut reader = self.reader()?;
        let mut buf = [0u8; SLOT_SIZE];
        for n in 0..count {
            reader.read_exact(&mut buf).map_err(CabinetError::Io)?;
            visit(n * SLOT_SIZE as u64, &buf)?;
        }
        Ok(())
    }

    /// Decodes every live slot that satisfies `keep`.
    fn live_records<F>(&self, mut keep: F) -> Result<Vec<Record>>
    where
        F: FnMut(&Record) -> bool,
    {
        let mut records = Vec::new();
        self.scan_slots(|offset, bytes| {
            if slot::decode_header(bytes).status.is_deleted() {
                return Ok(());
            }
            let (_, record) = slot::decode(bytes, offset)?;
            if keep(&record) {
                records.push(record);
            }
            Ok(())
        })?;
        Ok(records)
    }

    /// Offset and header of the first live slot holding `id`.
    fn locate(&self, id: RecordId) -> Result<(u64, SlotHeader)> {
        self.scan_headers()?
            .into_iter()
            .find(|(_, header)| header.record_id() == Some(id) && !header.status.is_deleted())
            .ok_or(CabinetError::RecordNotFound(id))
    }

    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(CabinetError::Io)?;
        self.file.write_all(bytes).map_err(CabinetError::Io)?;
        self.file.flush().map_err(CabinetError::Io)?;
        Ok(())
    }

    fn find_by_name<F>(&self, value: &str, pick: F) -> Result<Vec<Record>>
    where
        F: Fn(&RecordFields) -> &str,
    {
        let wanted = value.to_lowercase();
        self.live_records(|record| pick(&record.fields).to_lowercase() == wanted)
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cabinet".to_string());
        self.path
            .with_file_name(format!(".{}-{}.tmp", name, Uuid::new_v4()))
    }
}

impl RecordStore for FileStore {
    fn create_record(&mut self, fields: &RecordFields) -> Result<RecordId> {
        self.validator.validate(fields)?;

        let id = self.next_id;
        let bytes = slot::encode(SlotStatus::empty(), &Record::new(id, fields.clone()))?;
        let offset = self.slot_count()? * SLOT_SIZE as u64;
        self.write_at(offset, &bytes)?;
        self.next_id += 1;
        Ok(id)
    }

    fn edit_record(&mut self, id: RecordId, fields: &RecordFields) -> Result<()> {
        self.validator.validate(fields)?;

        let (offset, _) = self.locate(id)?;
        let bytes = slot::encode(SlotStatus::empty(), &Record::new(id, fields.clone()))?;
        self.write_at(offset, &bytes)
    }

    fn remove_record(&mut self, id: RecordId) -> Result<()> {
        let (offset, header) = self.locate(id)?;
        let status = header.status | SlotStatus::DELETED;
        self.write_at(offset, &slot::status_bytes(status))
    }

    fn get_records(&self) -> Result<Vec<Record>> {
        self.live_records(|_| true)
    }

    fn get_stat(&self) -> Result<RecordStat> {
        let headers = self.scan_headers()?;
        let deleted = headers
            .iter()
            .filter(|(_, header)| header.status.is_deleted())
            .count();
        Ok(RecordStat {
            total: headers.len() - deleted,
            deleted,
        })
    }

    fn find_by_first_name(&self, value: &str) -> Result<Vec<Record>> {
        self.find_by_name(value, |f| f.first_name.as_str())
    }

    fn find_by_last_name(&self, value: &str) -> Result<Vec<Record>> {
        self.find_by_name(value, |f| f.last_name.as_str())
    }

    fn find_by_date_of_birth(&self, value: &str) -> Result<Vec<Record>> {
        let date = parse_date(value)?;
        self.live_records(|record| record.fields.date_of_birth == date)
    }

    /// Copies live slots to a temp file beside the data file, then renames it
    /// over the original and reopens. Surviving ids are kept as they are.
    fn purge(&mut self) -> Result<usize> {
        let tombstoned = self.get_stat()?.deleted;
        if tombstoned == 0 {
            return Ok(0);
        }

        let temp_path = self.temp_path();
        let swapped = self.copy_live_slots(&temp_path).and_then(|purged| {
            fs::rename(&temp_path, &self.path).map_err(CabinetError::Io)?;
            Ok(purged)
        });
        let purged = match swapped {
            Ok(purged) => purged,
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                return Err(e);
            }
        };
        self.file = open_rw(&self.path)?;

        debug!(path = %self.path.display(), purged, "purged tombstoned slots");
        Ok(purged)
    }
}

impl FileStore {
    fn copy_live_slots(&self, temp_path: &Path) -> Result<usize> {
        let temp = File::create(temp_path).map_err(CabinetError::Io)?;
        let mut writer = BufWriter::new(temp);
        let mut purged = 0;
        self.scan_slots(|_, bytes| {
            if slot::decode_header(bytes).status.is_deleted() {
                purged += 1;
                return Ok(());
            }
            writer.write_all(bytes).map_err(CabinetError::Io)
        })?;
        let temp = writer
            .into_inner()
            .map_err(|e| CabinetError::Io(e.into_error()))?;
        temp.sync_all().map_err(CabinetError::Io)?;
        Ok(purged)
    }
}

fn open_rw(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(CabinetError::Io)
}
