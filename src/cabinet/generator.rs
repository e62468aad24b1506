//! Random record generation for test data.
//!
//! Generated records always pass the `default` validation preset.

use crate::model::{Record, RecordFields, RecordId};
use chrono::{Datelike, Duration, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Boris", "Clara", "Dmitri", "Elena", "Felix", "Greta", "Hugo", "Irina", "Jonas",
    "Katya", "Leon", "Marta", "Nikolai", "Olga", "Pavel", "Quinn", "Rosa", "Stefan", "Tanya",
];

const LAST_NAMES: &[&str] = &[
    "Andersen", "Brooks", "Carter", "Dubois", "Evans", "Fischer", "Garcia", "Hansen", "Ivanova",
    "Jensen", "Kowalski", "Lindqvist", "Moreau", "Novak", "Olsen", "Petrov", "Quiroga", "Rossi",
];

const GENDERS: [char; 2] = ['M', 'F'];
const SALARY_CENTS_MAX: i64 = 100_000_000;

pub struct RecordGenerator<R: Rng> {
    rng: R,
    earliest: NaiveDate,
    latest: NaiveDate,
}

impl RecordGenerator<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RecordGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            earliest: NaiveDate::from_ymd_opt(1950, 1, 1).unwrap_or_default(),
            latest: Local::now().date_naive(),
        }
    }

    pub fn fields(&mut self) -> RecordFields {
        let span = (self.latest - self.earliest).num_days().max(0);
        let date_of_birth = self.earliest + Duration::days(self.rng.gen_range(0..=span));
        let age = age_on(date_of_birth, self.latest);

        RecordFields {
            first_name: pick(&mut self.rng, FIRST_NAMES).to_string(),
            last_name: pick(&mut self.rng, LAST_NAMES).to_string(),
            date_of_birth,
            age,
            salary: Decimal::new(self.rng.gen_range(0..=SALARY_CENTS_MAX), 2),
            gender: GENDERS[self.rng.gen_range(0..GENDERS.len())],
        }
    }

    /// `count` records numbered from `start_id`, or `None` when the last id
    /// would not fit a [`RecordId`].
    pub fn generate(&mut self, start_id: RecordId, count: usize) -> Option<Vec<Record>> {
        if count > 0 {
            let span = RecordId::try_from(count - 1).ok()?;
            start_id.checked_add(span)?;
        }
        Some(
            (0..count)
                .map(|offset| Record::new(start_id + offset as RecordId, self.fields()))
                .collect(),
        )
    }
}

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or("Anon")
}

fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i16 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age.clamp(0, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{RecordValidator, ValidationRules};

    #[test]
    fn generated_records_pass_default_rules() {
        let validator = ValidationRules::default_preset().build();
        let mut generator = RecordGenerator::seeded(7);
        for record in generator.generate(1, 200).unwrap() {
            assert_eq!(validator.validate(&record.fields), Ok(()), "{:?}", record);
        }
    }

    #[test]
    fn ids_start_at_requested_value() {
        let records = RecordGenerator::seeded(1).generate(40, 3).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![40, 41, 42]);
    }

    #[test]
    fn ids_past_the_id_range_are_refused() {
        let mut generator = RecordGenerator::seeded(1);
        assert!(generator.generate(RecordId::MAX, 2).is_none());
        assert!(generator.generate(RecordId::MAX - 9, 11).is_none());

        let last = generator.generate(RecordId::MAX, 1).unwrap();
        assert_eq!(last[0].id, RecordId::MAX);
        assert_eq!(generator.generate(RecordId::MAX, 0), Some(Vec::new()));
    }

    #[test]
    fn same_seed_same_records() {
        let a = RecordGenerator::seeded(99).generate(1, 5).unwrap();
        let b = RecordGenerator::seeded(99).generate(1, 5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn age_counts_completed_years() {
        let dob = NaiveDate::from_ymd_opt(1990, 5, 1).unwrap();
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()), 33);
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()), 34);
    }
}
