//! Binary codec for one fixed-size record slot.
//!
//! ```text
//! offset  size  field
//!      0     2  status      (u16 LE bit mask, see SlotStatus)
//!      2     4  id          (i32 LE)
//!      6   120  first name  (60 UTF-16LE code units, space padded)
//!    126   120  last name   (60 UTF-16LE code units, space padded)
//!    246     4  birth year  (i32 LE)
//!    250     4  birth month (i32 LE)
//!    254     4  birth day   (i32 LE)
//!    258     2  age         (i16 LE)
//!    260    16  salary      (lo, mid, hi, flags; u32 LE each)
//!    276     2  gender      (one UTF-16LE code unit)
//! ```
//!
//! Name widths are measured in encoded code units, so a name that would spill
//! past its field is refused before anything is written.

use crate::error::{CabinetError, Result};
use crate::model::{Record, RecordFields, RecordId};
use bitflags::bitflags;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

pub const SLOT_SIZE: usize = 278;
pub const NAME_UNITS: usize = 60;

/// Bytes of the status + id prefix read by header-only scans.
pub const HEADER_SIZE: usize = 6;

const STATUS: usize = 0;
const ID: usize = 2;
const FIRST_NAME: usize = 6;
const LAST_NAME: usize = FIRST_NAME + NAME_UNITS * 2;
const YEAR: usize = LAST_NAME + NAME_UNITS * 2;
const MONTH: usize = YEAR + 4;
const DAY: usize = MONTH + 4;
const AGE: usize = DAY + 4;
const SALARY: usize = AGE + 2;
const GENDER: usize = SALARY + 16;

const PAD_UNIT: u16 = 0x0020;
const DECIMAL_MAX_SCALE: u32 = 28;
const DECIMAL_SIGN_BIT: u32 = 1 << 31;
const DECIMAL_SCALE_MASK: u32 = 0x00FF_0000;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct SlotStatus: u16 {
        const DELETED = 0b100;
    }
}

impl SlotStatus {
    pub fn is_deleted(self) -> bool {
        self.contains(SlotStatus::DELETED)
    }
}

pub type Slot = [u8; SLOT_SIZE];

/// Status and id of a slot, as read by header-only scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotHeader {
    pub status: SlotStatus,
    /// Raw id as stored; only positive values name a record.
    pub id: i32,
}

impl SlotHeader {
    pub fn record_id(&self) -> Option<RecordId> {
        RecordId::try_from(self.id).ok().filter(|id| *id > 0)
    }
}

pub fn encode(status: SlotStatus, record: &Record) -> Result<Slot> {
    let fields = &record.fields;
    let mut slot = [0u8; SLOT_SIZE];

    put(&mut slot, STATUS, &status.bits().to_le_bytes());
    put(&mut slot, ID, &encode_id(record.id)?.to_le_bytes());
    put_name(&mut slot, FIRST_NAME, &fields.first_name, "first name")?;
    put_name(&mut slot, LAST_NAME, &fields.last_name, "last name")?;

    let dob = fields.date_of_birth;
    put(&mut slot, YEAR, &dob.year().to_le_bytes());
    put(&mut slot, MONTH, &(dob.month() as i32).to_le_bytes());
    put(&mut slot, DAY, &(dob.day() as i32).to_le_bytes());
    put(&mut slot, AGE, &fields.age.to_le_bytes());
    put(&mut slot, SALARY, &encode_decimal(fields.salary));

    let mut units = [0u16; 2];
    let gender = fields.gender.encode_utf16(&mut units);
    if gender.len() != 1 {
        return Err(CabinetError::Format(format!(
            "gender '{}' does not fit in one UTF-16 code unit",
            fields.gender
        )));
    }
    put(&mut slot, GENDER, &gender[0].to_le_bytes());

    Ok(slot)
}

/// Reads the status and id without decoding the rest of the slot.
pub fn decode_header(bytes: &[u8]) -> SlotHeader {
    SlotHeader {
        status: SlotStatus::from_bits_retain(u16::from_le_bytes([bytes[STATUS], bytes[STATUS + 1]])),
        id: i32_at(bytes, ID),
    }
}

/// Decodes a full slot. `offset` only feeds the error message.
pub fn decode(slot: &Slot, offset: u64) -> Result<(SlotStatus, Record)> {
    let corrupted = |reason: String| CabinetError::CorruptedSlot { offset, reason };

    let header = decode_header(slot);
    let id = header
        .record_id()
        .ok_or_else(|| corrupted(format!("non-positive id {}", header.id)))?;

    let first_name = name_at(slot, FIRST_NAME).map_err(|e| corrupted(e.to_string()))?;
    let last_name = name_at(slot, LAST_NAME).map_err(|e| corrupted(e.to_string()))?;

    let (year, month, day) = (i32_at(slot, YEAR), i32_at(slot, MONTH), i32_at(slot, DAY));
    let date_of_birth = u32::try_from(month)
        .ok()
        .zip(u32::try_from(day).ok())
        .and_then(|(m, d)| NaiveDate::from_ymd_opt(year, m, d))
        .ok_or_else(|| corrupted(format!("invalid date {}-{}-{}", year, month, day)))?;

    let age = i16::from_le_bytes([slot[AGE], slot[AGE + 1]]);
    let salary = decode_decimal(&slot[SALARY..SALARY + 16]).map_err(corrupted)?;

    let unit = u16::from_le_bytes([slot[GENDER], slot[GENDER + 1]]);
    let gender = char::decode_utf16([unit])
        .next()
        .and_then(|c| c.ok())
        .ok_or_else(|| corrupted(format!("invalid gender code unit {:#06x}", unit)))?;

    let fields = RecordFields {
        first_name,
        last_name,
        date_of_birth,
        age,
        salary,
        gender,
    };
    Ok((header.status, Record::new(id, fields)))
}

/// Overwrites only the status field of an encoded slot.
pub fn status_bytes(status: SlotStatus) -> [u8; 2] {
    status.bits().to_le_bytes()
}

fn put(slot: &mut Slot, at: usize, bytes: &[u8]) {
    slot[at..at + bytes.len()].copy_from_slice(bytes);
}

fn put_name(slot: &mut Slot, at: usize, name: &str, field: &str) -> Result<()> {
    let units: Vec<u16> = name.encode_utf16().collect();
    if units.len() > NAME_UNITS {
        return Err(CabinetError::Format(format!(
            "{} is {} UTF-16 code units long, the slot holds {}",
            field,
            units.len(),
            NAME_UNITS
        )));
    }
    let padded = units
        .into_iter()
        .chain(std::iter::repeat(PAD_UNIT))
        .take(NAME_UNITS);
    for (i, unit) in padded.enumerate() {
        put(slot, at + i * 2, &unit.to_le_bytes());
    }
    Ok(())
}

fn name_at(slot: &[u8], at: usize) -> std::result::Result<String, std::string::FromUtf16Error> {
    let units: Vec<u16> = slot[at..at + NAME_UNITS * 2]
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let name = String::from_utf16(&units)?;
    Ok(name.trim_end_matches(' ').to_string())
}

fn encode_id(id: RecordId) -> Result<i32> {
    i32::try_from(id)
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| CabinetError::Format(format!("record id {} does not fit a slot", id)))
}

fn i32_at(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn encode_decimal(value: Decimal) -> [u8; 16] {
    let magnitude = value.mantissa().unsigned_abs();
    let mut flags = value.scale() << 16;
    if value.is_sign_negative() && !value.is_zero() {
        flags |= DECIMAL_SIGN_BIT;
    }
    let mut out = [0u8; 16];
    out[0..4].copy_from_slice(&(magnitude as u32).to_le_bytes());
    out[4..8].copy_from_slice(&((magnitude >> 32) as u32).to_le_bytes());
    out[8..12].copy_from_slice(&((magnitude >> 64) as u32).to_le_bytes());
    out[12..16].copy_from_slice(&flags.to_le_bytes());
    out
}

fn decode_decimal(bytes: &[u8]) -> std::result::Result<Decimal, String> {
    let (lo, mid, hi, flags) = (u32_at(bytes, 0), u32_at(bytes, 4), u32_at(bytes, 8), u32_at(bytes, 12));
    if flags & !(DECIMAL_SIGN_BIT | DECIMAL_SCALE_MASK) != 0 {
        return Err(format!("invalid decimal flags {:#010x}", flags));
    }
    let scale = (flags & DECIMAL_SCALE_MASK) >> 16;
    if scale > DECIMAL_MAX_SCALE {
        return Err(format!("decimal scale {} exceeds {}", scale, DECIMAL_MAX_SCALE));
    }
    Ok(Decimal::from_parts(lo, mid, hi, flags & DECIMAL_SIGN_BIT != 0, scale))
}
