use super::{CompositeValidator, ValidatorBuilder};
use crate::error::{CabinetError, Result};
use chrono::{Local, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Which named rule set to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSet {
    #[default]
    Default,
    Custom,
}

impl RuleSet {
    pub fn name(self) -> &'static str {
        match self {
            RuleSet::Default => "default",
            RuleSet::Custom => "custom",
        }
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuleSet {
    type Err = CabinetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(RuleSet::Default),
            "custom" => Ok(RuleSet::Custom),
            other => Err(CabinetError::Config(format!(
                "unknown validation rules '{}' (expected 'default' or 'custom')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRule {
    pub min: usize,
    pub max: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRule {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRule {
    pub min: i16,
    pub max: i16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRule {
    #[serde(with = "decimal_str")]
    pub min: Decimal,
    #[serde(with = "decimal_str")]
    pub max: Decimal,
}

/// Bound values for one rule set.
///
/// The JSON shape mirrors one section of a rules file:
///
/// ```json
/// {
///   "firstName":   { "min": 2, "max": 60 },
///   "lastName":    { "min": 2, "max": 60 },
///   "dateOfBirth": { "from": "1950-01-01", "to": "2024-12-31" },
///   "age":         { "min": 0, "max": 120 },
///   "salary":      { "min": "0", "max": "1000000" },
///   "gender":      ["M", "F"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    pub first_name: LengthRule,
    pub last_name: LengthRule,
    pub date_of_birth: DateRule,
    pub age: AgeRule,
    pub salary: SalaryRule,
    pub gender: Vec<String>,
}

impl ValidationRules {
    /// Names 2-60, born since 1950, age 0-120, salary up to one million, gender M/F.
    pub fn default_preset() -> Self {
        Self {
            first_name: LengthRule { min: 2, max: 60 },
            last_name: LengthRule { min: 2, max: 60 },
            date_of_birth: DateRule {
                from: ymd(1950, 1, 1),
                to: today(),
            },
            age: AgeRule { min: 0, max: 120 },
            salary: SalaryRule {
                min: Decimal::ZERO,
                max: Decimal::new(1_000_000, 0),
            },
            gender: vec!["M".into(), "F".into()],
        }
    }

    /// Stricter bounds: adults only, names 3-50, four gender codes.
    pub fn custom_preset() -> Self {
        let today = today();
        Self {
            first_name: LengthRule { min: 3, max: 50 },
            last_name: LengthRule { min: 3, max: 50 },
            date_of_birth: DateRule {
                from: ymd(1960, 1, 1),
                to: today.checked_sub_months(Months::new(18 * 12)).unwrap_or(today),
            },
            age: AgeRule { min: 18, max: 100 },
            salary: SalaryRule {
                min: Decimal::new(1_000, 0),
                max: Decimal::new(1_000_000, 0),
            },
            gender: vec!["M".into(), "F".into(), "N".into(), "B".into()],
        }
    }

    pub fn preset(rule_set: RuleSet) -> Self {
        match rule_set {
            RuleSet::Default => Self::default_preset(),
            RuleSet::Custom => Self::custom_preset(),
        }
    }

    /// Loads one named section from a JSON rules file.
    pub fn load<P: AsRef<Path>>(path: P, rule_set: RuleSet) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(CabinetError::Io)?;
        let mut sections: HashMap<String, ValidationRules> =
            serde_json::from_str(&content).map_err(CabinetError::Serialization)?;
        let rules = sections.remove(rule_set.name()).ok_or_else(|| {
            CabinetError::Config(format!(
                "rules file {} has no '{}' section",
                path.display(),
                rule_set
            ))
        })?;
        rules.check()?;
        Ok(rules)
    }

    /// Rejects inverted ranges and an empty gender set.
    pub fn check(&self) -> Result<()> {
        let inverted = self.first_name.min > self.first_name.max
            || self.last_name.min > self.last_name.max
            || self.date_of_birth.from > self.date_of_birth.to
            || self.age.min > self.age.max
            || self.salary.min > self.salary.max;
        if inverted {
            return Err(CabinetError::Config(
                "validation rules contain an inverted range".to_string(),
            ));
        }
        if self.gender_chars().is_empty() {
            return Err(CabinetError::Config(
                "validation rules allow no gender".to_string(),
            ));
        }
        Ok(())
    }

    pub fn gender_chars(&self) -> Vec<char> {
        self.gender.iter().flat_map(|s| s.chars()).collect()
    }

    pub fn build(&self) -> CompositeValidator {
        ValidatorBuilder::new()
            .first_name(self.first_name.min, self.first_name.max)
            .last_name(self.last_name.min, self.last_name.max)
            .date_of_birth(self.date_of_birth.from, self.date_of_birth.to)
            .age(self.age.min, self.age.max)
            .salary(self.salary.min, self.salary.max)
            .gender(self.gender_chars())
            .build()
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Salary bounds travel as strings so no precision is lost to JSON floats.
mod decimal_str {
    use rust_decimal::Decimal;
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Decimal::from_str(&s).map_err(de::Error::custom),
            Raw::Int(n) => Ok(Decimal::from(n)),
        }
    }
}
