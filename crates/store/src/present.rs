//! Text rendering for query outcomes.

use crate::query::QueryOutcome;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Render an outcome for the terminal.
///
/// Rows become a bordered table; status and failure messages are returned
/// verbatim.
#[must_use]
pub fn render_outcome(outcome: &QueryOutcome) -> String {
    match outcome {
        QueryOutcome::Rows { columns, rows } => render_table(columns, rows),
        QueryOutcome::Status(message) | QueryOutcome::Failure(message) => message.clone(),
    }
}

/// Render `columns` and `rows` as a psql-style bordered table.
///
/// A column is right-aligned when it holds at least one value and every
/// non-null value is a number. Widths are measured in characters.
#[must_use]
pub fn render_table(columns: &[String], rows: &[Vec<Value>]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            (0..columns.len())
                .map(|index| row.get(index).unwrap_or(&Value::Null).to_string())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, name)| {
            cells
                .iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .fold(name.chars().count(), usize::max)
        })
        .collect();

    let aligns: Vec<Align> = (0..columns.len())
        .map(|index| column_align(rows, index))
        .collect();

    let mut out = String::new();
    push_rule(&mut out, &widths, '+', '+');
    push_line(&mut out, columns, &widths, &aligns);
    push_rule(&mut out, &widths, '|', '+');
    for row in &cells {
        push_line(&mut out, row, &widths, &aligns);
    }
    push_rule(&mut out, &widths, '+', '+');
    // Drop the trailing newline
    out.pop();
    out
}

fn column_align(rows: &[Vec<Value>], index: usize) -> Align {
    let mut values = rows
        .iter()
        .filter_map(|row| row.get(index))
        .filter(|value| **value != Value::Null)
        .peekable();
    if values.peek().is_some() && values.all(Value::is_numeric) {
        Align::Right
    } else {
        Align::Left
    }
}

fn push_rule(out: &mut String, widths: &[usize], edge: char, joint: char) {
    out.push(edge);
    for (index, width) in widths.iter().enumerate() {
        if index > 0 {
            out.push(joint);
        }
        out.push_str(&"-".repeat(width + 2));
    }
    out.push(edge);
    out.push('\n');
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize], aligns: &[Align]) {
    out.push('|');
    for (index, (cell, width)) in cells.iter().zip(widths.iter().copied()).enumerate() {
        if index > 0 {
            out.push('|');
        }
        let padded = match aligns.get(index) {
            Some(Align::Right) => format!(" {cell:>width$} "),
            _ => format!(" {cell:<width$} "),
        };
        out.push_str(&padded);
    }
    out.push('|');
    out.push('\n');
}
