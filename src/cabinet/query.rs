//! Query clauses for the `delete`, `update` and `select` commands.
//!
//! ```text
//! delete where lastname='Doe'
//! update set salary=1200.50, gender=M where firstname='John' and age=40
//! select id, firstname, dateofbirth where lastname=Doe or lastname=Roe
//! ```
//!
//! Values may be bare words or wrapped in single or double quotes. Keywords
//! are case-insensitive. A predicate joins its conditions with either `and`
//! or `or`; mixing the two in one predicate is rejected. Values are parsed
//! into typed fields up front, so a bad date fails before any record is
//! touched.

use crate::error::{CabinetError, Result};
use crate::model::{
    format_date, parse_age, parse_date, parse_gender, parse_salary, Record, RecordFields, RecordId,
};
use crate::store::RecordStore;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// A record column addressable from a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    FirstName,
    LastName,
    DateOfBirth,
    Age,
    Salary,
    Gender,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Id,
        Column::FirstName,
        Column::LastName,
        Column::DateOfBirth,
        Column::Age,
        Column::Salary,
        Column::Gender,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::FirstName => "firstname",
            Column::LastName => "lastname",
            Column::DateOfBirth => "dateofbirth",
            Column::Age => "age",
            Column::Salary => "salary",
            Column::Gender => "gender",
        }
    }

    /// Display text of this column for one record.
    pub fn value_of(self, record: &Record) -> String {
        let f = &record.fields;
        match self {
            Column::Id => record.id.to_string(),
            Column::FirstName => f.first_name.clone(),
            Column::LastName => f.last_name.clone(),
            Column::DateOfBirth => format_date(f.date_of_birth),
            Column::Age => f.age.to_string(),
            Column::Salary => format!("{:.2}", f.salary),
            Column::Gender => f.gender.to_string(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = CabinetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "id" => Ok(Column::Id),
            "firstname" => Ok(Column::FirstName),
            "lastname" => Ok(Column::LastName),
            "dateofbirth" | "dob" => Ok(Column::DateOfBirth),
            "age" => Ok(Column::Age),
            "salary" => Ok(Column::Salary),
            "gender" => Ok(Column::Gender),
            _ => Err(CabinetError::Api(format!("unknown field '{}'", s))),
        }
    }
}

/// A column paired with a parsed value: a condition in `where`, an
/// assignment in `set`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Id(RecordId),
    FirstName(String),
    LastName(String),
    DateOfBirth(NaiveDate),
    Age(i16),
    Salary(Decimal),
    Gender(char),
}

impl FieldValue {
    pub fn parse(column: Column, raw: &str) -> Result<Self> {
        Ok(match column {
            Column::Id => FieldValue::Id(
                raw.trim()
                    .trim_start_matches('#')
                    .parse()
                    .map_err(|_| CabinetError::Format(format!("invalid id '{}'", raw.trim())))?,
            ),
            Column::FirstName => FieldValue::FirstName(raw.trim().to_string()),
            Column::LastName => FieldValue::LastName(raw.trim().to_string()),
            Column::DateOfBirth => FieldValue::DateOfBirth(parse_date(raw)?),
            Column::Age => FieldValue::Age(parse_age(raw)?),
            Column::Salary => FieldValue::Salary(parse_salary(raw)?),
            Column::Gender => FieldValue::Gender(parse_gender(raw)?),
        })
    }

    pub fn column(&self) -> Column {
        match self {
            FieldValue::Id(_) => Column::Id,
            FieldValue::FirstName(_) => Column::FirstName,
            FieldValue::LastName(_) => Column::LastName,
            FieldValue::DateOfBirth(_) => Column::DateOfBirth,
            FieldValue::Age(_) => Column::Age,
            FieldValue::Salary(_) => Column::Salary,
            FieldValue::Gender(_) => Column::Gender,
        }
    }

    /// Names compare case-insensitively, like the find operations.
    pub fn matches(&self, record: &Record) -> bool {
        let f = &record.fields;
        match self {
            FieldValue::Id(id) => record.id == *id,
            FieldValue::FirstName(name) => f.first_name.to_lowercase() == name.to_lowercase(),
            FieldValue::LastName(name) => f.last_name.to_lowercase() == name.to_lowercase(),
            FieldValue::DateOfBirth(date) => f.date_of_birth == *date,
            FieldValue::Age(age) => f.age == *age,
            FieldValue::Salary(salary) => f.salary == *salary,
            FieldValue::Gender(gender) => f.gender == *gender,
        }
    }

    /// Writes the value into `fields`. Ids are not fields; the parser never
    /// produces an id assignment.
    pub fn apply(&self, fields: &mut RecordFields) {
        match self {
            FieldValue::Id(_) => {}
            FieldValue::FirstName(name) => fields.first_name = name.clone(),
            FieldValue::LastName(name) => fields.last_name = name.clone(),
            FieldValue::DateOfBirth(date) => fields.date_of_birth = *date,
            FieldValue::Age(age) => fields.age = *age,
            FieldValue::Salary(salary) => fields.salary = *salary,
            FieldValue::Gender(gender) => fields.gender = *gender,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Id(id) => write!(f, "id={}", id),
            FieldValue::FirstName(name) => write!(f, "firstname='{}'", name),
            FieldValue::LastName(name) => write!(f, "lastname='{}'", name),
            FieldValue::DateOfBirth(date) => write!(f, "dateofbirth='{}'", format_date(*date)),
            FieldValue::Age(age) => write!(f, "age={}", age),
            FieldValue::Salary(salary) => write!(f, "salary={}", salary),
            FieldValue::Gender(gender) => write!(f, "gender='{}'", gender),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    All,
    Any,
}

/// The `where` part of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub logic: Logic,
    pub conditions: Vec<FieldValue>,
}

impl Predicate {
    pub fn matches(&self, record: &Record) -> bool {
        match self.logic {
            Logic::All => self.conditions.iter().all(|c| c.matches(record)),
            Logic::Any => self.conditions.iter().any(|c| c.matches(record)),
        }
    }

    /// Live records satisfying the predicate, in store order. A single
    /// condition on an indexed field goes through the store's find.
    pub fn select<S: RecordStore + ?Sized>(&self, store: &S) -> Result<Vec<Record>> {
        if let [only] = self.conditions.as_slice() {
            match only {
                FieldValue::FirstName(name) => return store.find_by_first_name(name),
                FieldValue::LastName(name) => return store.find_by_last_name(name),
                FieldValue::DateOfBirth(date) => {
                    return store.find_by_date_of_birth(&date.to_string())
                }
                _ => {}
            }
        }
        Ok(store
            .get_records()?
            .into_iter()
            .filter(|record| self.matches(record))
            .collect())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joiner = match self.logic {
            Logic::All => " and ",
            Logic::Any => " or ",
        };
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                f.write_str(joiner)?;
            }
            write!(f, "{}", condition)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateQuery {
    pub assignments: Vec<FieldValue>,
    pub predicate: Predicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub columns: Vec<Column>,
    pub predicate: Option<Predicate>,
}

/// `where <predicate>`
pub fn parse_delete(input: &str) -> Result<Predicate> {
    let mut parser = Parser::new(input)?;
    parser.expect_keyword("where", "delete where <field>=<value>")?;
    let predicate = parser.predicate()?;
    parser.expect_end()?;
    Ok(predicate)
}

/// `set <field>=<value>[, ...] where <predicate>`
pub fn parse_update(input: &str) -> Result<UpdateQuery> {
    const USAGE: &str = "update set <field>=<value>[, ...] where <field>=<value>";
    let mut parser = Parser::new(input)?;
    parser.expect_keyword("set", USAGE)?;

    let mut assignments = vec![parser.pair()?];
    while parser.eat(&Token::Comma) {
        assignments.push(parser.pair()?);
    }
    if assignments.iter().any(|a| a.column() == Column::Id) {
        return Err(CabinetError::Api("id can't be updated".to_string()));
    }

    parser.expect_keyword("where", USAGE)?;
    let predicate = parser.predicate()?;
    parser.expect_end()?;
    Ok(UpdateQuery {
        assignments,
        predicate,
    })
}

/// `[<column>[, ...] | *] [where <predicate>]`. No columns means all of them.
pub fn parse_select(input: &str) -> Result<SelectQuery> {
    let mut parser = Parser::new(input)?;

    let mut columns = Vec::new();
    if !parser.at_end() && !parser.at_keyword("where") {
        loop {
            match parser.next() {
                Some(Token::Word(word)) if word == "*" => columns.extend(Column::ALL),
                Some(Token::Word(word)) => columns.push(word.parse()?),
                _ => return Err(syntax("select <field>[, ...] [where <field>=<value>]")),
            }
            if !parser.eat(&Token::Comma) {
                break;
            }
        }
    }
    if columns.is_empty() {
        columns.extend(Column::ALL);
    }

    let predicate = if parser.eat_keyword("where") {
        Some(parser.predicate()?)
    } else {
        None
    };
    parser.expect_end()?;
    Ok(SelectQuery { columns, predicate })
}

fn syntax(usage: &str) -> CabinetError {
    CabinetError::Api(format!("Invalid query format. Use: {}", usage))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
    Eq,
    Comma,
}

/// Quotes only open a value at the start of a token, so `O'Brien` stays one
/// bare word.
fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '=' => {
                chars.next();
                tokens.push(Token::Eq);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '\'' | '"' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == c => break,
                        Some(ch) => value.push(ch),
                        None => return Err(CabinetError::Api("unterminated quote".to_string())),
                    }
                }
                tokens.push(Token::Quoted(value));
            }
            _ => {
                let mut word = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_whitespace() || ch == '=' || ch == ',' {
                        break;
                    }
                    word.push(ch);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self> {
        Ok(Self {
            tokens: tokenize(input)?,
            pos: 0,
        })
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.tokens.get(self.pos) == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.tokens.get(self.pos), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str, usage: &str) -> Result<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(syntax(usage))
        }
    }

    fn expect_end(&self) -> Result<()> {
        match self.tokens.get(self.pos) {
            None => Ok(()),
            Some(token) => Err(CabinetError::Api(format!(
                "unexpected {} at the end of the query",
                describe(token)
            ))),
        }
    }

    /// `<field>=<value>`
    fn pair(&mut self) -> Result<FieldValue> {
        let column: Column = match self.next() {
            Some(Token::Word(name)) => name.parse()?,
            other => return Err(expected("a field name", other.as_ref())),
        };
        if !self.eat(&Token::Eq) {
            return Err(expected("'='", self.tokens.get(self.pos)));
        }
        match self.next() {
            Some(Token::Word(value)) | Some(Token::Quoted(value)) => FieldValue::parse(column, &value),
            other => Err(expected("a value", other.as_ref())),
        }
    }

    fn predicate(&mut self) -> Result<Predicate> {
        let mut conditions = vec![self.pair()?];
        let mut logic = None;

        loop {
            let joined = if self.eat_keyword("and") {
                Logic::All
            } else if self.eat_keyword("or") {
                Logic::Any
            } else {
                break;
            };
            if logic.is_some_and(|seen| seen != joined) {
                return Err(CabinetError::Api(
                    "mixing 'and' with 'or' in one query is not supported".to_string(),
                ));
            }
            logic = Some(joined);
            conditions.push(self.pair()?);
        }

        Ok(Predicate {
            logic: logic.unwrap_or(Logic::All),
            conditions,
        })
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Word(w) => format!("'{}'", w),
        Token::Quoted(q) => format!("'{}'", q),
        Token::Eq => "'='".to_string(),
        Token::Comma => "','".to_string(),
    }
}

fn expected(what: &str, found: Option<&Token>) -> CabinetError {
    match found {
        Some(token) => CabinetError::Api(format!("expected {}, found {}", what, describe(token))),
        None => CabinetError::Api(format!("expected {} at the end of the query", what)),
    }
}
