use super::{RecordValidator, ValidationError, ValidationResult};
use crate::model::RecordFields;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Names may not start or end with whitespace; slot padding is
/// indistinguishable from it.
fn name_in_bounds(name: &str, min: usize, max: usize) -> bool {
    let len = name.chars().count();
    !name.trim().is_empty() && name.trim() == name && len >= min && len <= max
}

pub struct FirstNameValidator {
    min: usize,
    max: usize,
}

impl FirstNameValidator {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

impl RecordValidator for FirstNameValidator {
    fn validate(&self, fields: &RecordFields) -> ValidationResult {
        if name_in_bounds(&fields.first_name, self.min, self.max) {
            Ok(())
        } else {
            Err(ValidationError::FirstName {
                min: self.min,
                max: self.max,
            })
        }
    }
}

pub struct LastNameValidator {
    min: usize,
    max: usize,
}

impl LastNameValidator {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

impl RecordValidator for LastNameValidator {
    fn validate(&self, fields: &RecordFields) -> ValidationResult {
        if name_in_bounds(&fields.last_name, self.min, self.max) {
            Ok(())
        } else {
            Err(ValidationError::LastName {
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Inclusive on both ends.
pub struct DateOfBirthValidator {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateOfBirthValidator {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }
}

impl RecordValidator for DateOfBirthValidator {
    fn validate(&self, fields: &RecordFields) -> ValidationResult {
        if fields.date_of_birth < self.from || fields.date_of_birth > self.to {
            return Err(ValidationError::DateOfBirth {
                from: self.from,
                to: self.to,
            });
        }
        Ok(())
    }
}

pub struct AgeValidator {
    min: i16,
    max: i16,
}

impl AgeValidator {
    pub fn new(min: i16, max: i16) -> Self {
        Self { min, max }
    }
}

impl RecordValidator for AgeValidator {
    fn validate(&self, fields: &RecordFields) -> ValidationResult {
        if !(self.min..=self.max).contains(&fields.age) {
            return Err(ValidationError::Age {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

pub struct SalaryValidator {
    min: Decimal,
    max: Decimal,
}

impl SalaryValidator {
    /// A negative lower bound is raised to zero: salaries are never negative.
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self {
            min: min.max(Decimal::ZERO),
            max,
        }
    }
}

impl RecordValidator for SalaryValidator {
    fn validate(&self, fields: &RecordFields) -> ValidationResult {
        if fields.salary < self.min || fields.salary > self.max {
            return Err(ValidationError::Salary {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

pub struct GenderValidator {
    allowed: Vec<char>,
}

impl GenderValidator {
    pub fn new(allowed: impl IntoIterator<Item = char>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }
}

impl RecordValidator for GenderValidator {
    fn validate(&self, fields: &RecordFields) -> ValidationResult {
        if self.allowed.contains(&fields.gender) {
            return Ok(());
        }
        Err(ValidationError::Gender {
            allowed: self
                .allowed
                .iter()
                .map(char::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}
