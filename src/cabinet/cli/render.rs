use cabinet::api::{CmdMessage, MessageLevel};
use cabinet::model::Record;
use cabinet::query::Column;
use colored::Colorize;
use std::fmt::Write;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ID_WIDTH: usize = 6;
const NAME_WIDTH: usize = 20;
const DATE_WIDTH: usize = 11;
const AGE_WIDTH: usize = 4;
const SALARY_WIDTH: usize = 14;

const HEADER: [&str; 7] = [
    "Id",
    "First name",
    "Last name",
    "Born",
    "Age",
    "Salary",
    "Gender",
];

pub(super) fn print_messages(messages: &[CmdMessage]) {
    print!("{}", render_messages(messages));
}

pub(super) fn print_records(records: &[Record]) {
    print!("{}", render_records(records));
}

pub(super) fn print_selection(records: &[Record], columns: &[Column]) {
    print!("{}", render_selection(records, columns));
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    render_messages_internal(messages, colored::control::SHOULD_COLORIZE.should_colorize())
}

fn render_messages_internal(messages: &[CmdMessage], use_color: bool) -> String {
    let mut out = String::new();
    for message in messages {
        let line = if use_color {
            match message.level {
                MessageLevel::Info => message.content.dimmed().to_string(),
                MessageLevel::Success => message.content.green().to_string(),
                MessageLevel::Warning => message.content.yellow().to_string(),
                MessageLevel::Error => message.content.red().to_string(),
            }
        } else {
            message.content.clone()
        };
        let _ = writeln!(out, "{}", line);
    }
    out
}

/// Renders records as an aligned table. Empty input renders nothing; the
/// command layer reports emptiness through its messages.
pub fn render_records(records: &[Record]) -> String {
    render_records_internal(records, colored::control::SHOULD_COLORIZE.should_colorize())
}

fn render_records_internal(records: &[Record], use_color: bool) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let header = row(&HEADER.map(str::to_string));
    if use_color {
        let _ = writeln!(out, "{}", header.bold());
    } else {
        let _ = writeln!(out, "{}", header);
    }

    for record in records {
        let f = &record.fields;
        let id = format!("#{}", record.id);
        let cells = [
            if use_color {
                id.yellow().to_string()
            } else {
                id
            },
            f.first_name.clone(),
            f.last_name.clone(),
            f.date_of_birth.format("%Y-%b-%d").to_string(),
            f.age.to_string(),
            f.salary.to_string(),
            f.gender.to_string(),
        ];
        let _ = writeln!(out, "{}", row(&cells));
    }
    out
}

fn row(cells: &[String; 7]) -> String {
    let widths = [
        ID_WIDTH,
        NAME_WIDTH,
        NAME_WIDTH,
        DATE_WIDTH,
        AGE_WIDTH,
        SALARY_WIDTH,
        0,
    ];
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        if width == 0 {
            line.push_str(cell);
        } else if i == 0 {
            // Colored ids carry escape codes, so pad by the plain id length.
            line.push_str(cell);
            let plain = strip_len(cell);
            line.push_str(&" ".repeat(width.saturating_sub(plain)));
        } else if i == 4 || i == 5 {
            line.push_str(&" ".repeat(width.saturating_sub(cell.width())));
            line.push_str(cell);
        } else {
            let cell = truncate_to_width(cell, width);
            line.push_str(&cell);
            line.push_str(&" ".repeat(width.saturating_sub(cell.width())));
        }
    }
    line.trim_end().to_string()
}

/// Boxed table of the selected columns, sized to the widest cell.
pub fn render_selection(records: &[Record], columns: &[Column]) -> String {
    if records.is_empty() || columns.is_empty() {
        return String::new();
    }

    let header: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| columns.iter().map(|c| c.value_of(record)).collect())
        .collect();

    let widths: Vec<usize> = (0..columns.len())
        .map(|i| {
            rows.iter()
                .map(|row| row[i].width())
                .chain(std::iter::once(header[i].width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "{}", boxed_row(&header, &widths));
    let separator: String = widths.iter().map(|w| format!("+{}", "-".repeat(w + 2))).collect();
    let _ = writeln!(out, "{}+", separator);
    for row in &rows {
        let _ = writeln!(out, "{}", boxed_row(row, &widths));
    }
    out
}

fn boxed_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (cell, width) in cells.iter().zip(widths) {
        line.push_str("| ");
        line.push_str(cell);
        line.push_str(&" ".repeat(width.saturating_sub(cell.width()) + 1));
    }
    line.push('|');
    line
}

fn strip_len(s: &str) -> usize {
    let mut len = 0;
    let mut in_escape = false;
    for c in s.chars() {
        match c {
            '\u{1b}' => in_escape = true,
            'm' if in_escape => in_escape = false,
            _ if in_escape => {}
            _ => len += c.width().unwrap_or(0),
        }
    }
    len
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}
