//! # Validation Pipeline
//!
//! Every record that enters a store passes through a [`RecordValidator`] first.
//! Stores run the validator to completion before touching any state, so a
//! rejected record never leaves a partial mutation behind.
//!
//! ## Composition
//!
//! Each field has its own validator in [`fields`]. A [`CompositeValidator`]
//! runs its children in insertion order and stops at the first violation,
//! returning that violation unchanged. [`ValidatorBuilder`] assembles one:
//!
//! ```text
//! ValidatorBuilder::new()
//!     .first_name(2, 60)
//!     .last_name(2, 60)
//!     .date_of_birth(from, to)
//!     .age(0, 120)
//!     .salary(min, max)
//!     .gender(['M', 'F'])
//!     .build()
//! ```
//!
//! ## Rule Sets
//!
//! The bounds come from [`rules::ValidationRules`], either one of the two
//! built-in presets (`default`, `custom`) or a JSON rules file. Both presets
//! validate the same six fields and differ only in their bounds.
//!
//! Validators are immutable after construction and are `Send + Sync`.

use crate::model::RecordFields;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

pub mod fields;
pub mod rules;

pub use fields::{
    AgeValidator, DateOfBirthValidator, FirstNameValidator, GenderValidator, LastNameValidator,
    SalaryValidator,
};
pub use rules::{RuleSet, ValidationRules};

/// A violated bound. The message names the field and the allowed range or set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("First name must be between {min} and {max} characters long and cannot be empty or start or end with whitespace")]
    FirstName { min: usize, max: usize },

    #[error("Last name must be between {min} and {max} characters long and cannot be empty or start or end with whitespace")]
    LastName { min: usize, max: usize },

    #[error("Date of birth must be between {} and {}", .from.format("%m/%d/%Y"), .to.format("%m/%d/%Y"))]
    DateOfBirth { from: NaiveDate, to: NaiveDate },

    #[error("Age must be between {min} and {max}")]
    Age { min: i16, max: i16 },

    #[error("Salary must be between {min} and {max}")]
    Salary { min: Decimal, max: Decimal },

    #[error("Gender must be one of: {allowed}")]
    Gender { allowed: String },
}

pub type ValidationResult = std::result::Result<(), ValidationError>;

/// A side-effect-free check over a candidate field set.
pub trait RecordValidator: Send + Sync {
    fn validate(&self, fields: &RecordFields) -> ValidationResult;
}

/// Runs child validators in order, failing fast on the first violation.
#[derive(Default)]
pub struct CompositeValidator {
    validators: Vec<Box<dyn RecordValidator>>,
}

impl CompositeValidator {
    pub fn new(validators: Vec<Box<dyn RecordValidator>>) -> Self {
        Self { validators }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl RecordValidator for CompositeValidator {
    fn validate(&self, fields: &RecordFields) -> ValidationResult {
        for validator in &self.validators {
            validator.validate(fields)?;
        }
        Ok(())
    }
}

/// Fluent assembly of a [`CompositeValidator`].
#[derive(Default)]
pub struct ValidatorBuilder {
    validators: Vec<Box<dyn RecordValidator>>,
}

impl ValidatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_name(mut self, min: usize, max: usize) -> Self {
        self.validators.push(Box::new(FirstNameValidator::new(min, max)));
        self
    }

    pub fn last_name(mut self, min: usize, max: usize) -> Self {
        self.validators.push(Box::new(LastNameValidator::new(min, max)));
        self
    }

    pub fn date_of_birth(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.validators.push(Box::new(DateOfBirthValidator::new(from, to)));
        self
    }

    pub fn age(mut self, min: i16, max: i16) -> Self {
        self.validators.push(Box::new(AgeValidator::new(min, max)));
        self
    }

    pub fn salary(mut self, min: Decimal, max: Decimal) -> Self {
        self.validators.push(Box::new(SalaryValidator::new(min, max)));
        self
    }

    pub fn gender(mut self, allowed: impl IntoIterator<Item = char>) -> Self {
        self.validators.push(Box::new(GenderValidator::new(allowed)));
        self
    }

    pub fn build(self) -> CompositeValidator {
        CompositeValidator::new(self.validators)
    }
}
