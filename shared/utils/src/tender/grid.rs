//! Typed cell grid
//!
//! The sheet is read without assuming a header row. Every cell becomes one of
//! three variants and row scanning works on their string form.

use calamine::{DataType, Range};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<&DataType> for Cell {
    fn from(value: &DataType) -> Self {
        match value {
            DataType::String(s) if s.is_empty() => Cell::Empty,
            DataType::String(s) => Cell::Text(s.clone()),
            DataType::Float(f) => Cell::Number(*f),
            DataType::Int(i) => Cell::Number(*i as f64),
            DataType::DateTime(serial) => Cell::Number(*serial),
            DataType::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            DataType::Error(_) | DataType::Empty => Cell::Empty,
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Row-major grid. `first_row` is the sheet row of `rows[0]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    first_row: usize,
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { first_row: 0, rows }
    }

    pub fn from_range(range: &Range<DataType>) -> Self {
        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
        let rows = range
            .rows()
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();
        Self { first_row, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows paired with their sheet row index.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &[Cell])> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(move |(i, row)| (self.first_row + i, row.as_slice()))
    }

    pub fn row(&self, position: usize) -> Option<&[Cell]> {
        self.rows.get(position).map(Vec::as_slice)
    }
}

/// Non-empty cells of a row joined by single spaces.
pub fn row_text(row: &[Cell]) -> String {
    row.iter()
        .filter(|cell| !cell.is_empty())
        .map(|cell| cell.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case-insensitive substring test.
pub fn contains_token(text: &str, token: &str) -> bool {
    text.to_uppercase().contains(&token.to_uppercase())
}

pub fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}
