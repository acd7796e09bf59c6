// The in-memory table of students.

use std::cmp::Ordering;
use std::fmt::Display;

use crate::houses::*;

/// The content of one cell, as read from a spreadsheet.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn sort_rank(&self) -> u8 {
        match self {
            CellValue::Bool(_) => 0,
            CellValue::Number(_) => 1,
            CellValue::Text(_) => 2,
            CellValue::Empty => 3,
        }
    }

    /// Numbers sort numerically and before text. Empty cells come last.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            _ => self.sort_rank().cmp(&other.sort_rank()),
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            // Rust prints whole floats without a fractional part: 1.0 -> "1"
            CellValue::Number(x) => write!(f, "{}", x),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A table of students: named columns, one row per student.
///
/// Rows always have exactly one cell per column.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Roster {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Roster {
    pub fn new(columns: Vec<String>) -> Roster {
        Roster {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// Adds a row, padding or truncating it to the number of columns.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// The display string of a cell. Missing columns read as empty.
    pub fn text(&self, row: usize, column: &str) -> String {
        self.cell(row, column)
            .map(|c| c.to_string())
            .unwrap_or_default()
    }

    /// Adds a column, or replaces the content of an existing one.
    pub fn set_column(&mut self, name: &str, mut values: Vec<CellValue>) {
        values.resize(self.rows.len(), CellValue::Empty);
        match self.column_index(name) {
            Some(col) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row[col] = v;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
    }

    /// Appends the rows of another table. The columns are the union of both
    /// tables, in the order in which they were first seen.
    pub fn append(&mut self, other: Roster) {
        for c in other.columns.iter() {
            if !self.has_column(c) {
                self.columns.push(c.clone());
                for row in self.rows.iter_mut() {
                    row.push(CellValue::Empty);
                }
            }
        }
        let mapping: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|c| other.column_index(c))
            .collect();
        for mut row in other.rows {
            let new_row: Vec<CellValue> = mapping
                .iter()
                .map(|m| match m {
                    Some(idx) => std::mem::replace(&mut row[*idx], CellValue::Empty),
                    None => CellValue::Empty,
                })
                .collect();
            self.rows.push(new_row);
        }
    }

    /// The distinct values of a column, sorted. Empty cells are left out.
    pub fn distinct(&self, column: &str) -> Vec<CellValue> {
        let col = match self.column_index(column) {
            Some(col) => col,
            None => return Vec::new(),
        };
        let mut res: Vec<CellValue> = Vec::new();
        for row in self.rows.iter() {
            let v = &row[col];
            if !v.is_empty() && !res.iter().any(|x| x.to_string() == v.to_string()) {
                res.push(v.clone());
            }
        }
        res.sort_by(|a, b| a.compare(b));
        res
    }

    /// The distinct display strings of a column, in the order of `distinct`.
    pub fn distinct_text(&self, column: &str) -> Vec<String> {
        self.distinct(column)
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    /// A new table with the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Roster {
        Roster {
            columns: self.columns.clone(),
            rows: indices.iter().map(|i| self.rows[*i].clone()).collect(),
        }
    }

    /// A new table restricted to the given columns.
    pub fn project(&self, columns: &[String]) -> HousesResult<Roster> {
        let mut indices: Vec<usize> = Vec::new();
        for c in columns {
            let idx = self.column_index(c).context(UnknownColumnSnafu {
                column: c.clone(),
                available: self.columns.clone(),
            })?;
            indices.push(idx);
        }
        Ok(Roster {
            columns: columns.to_vec(),
            rows: self
                .rows
                .iter()
                .map(|r| indices.iter().map(|i| r[*i].clone()).collect())
                .collect(),
        })
    }

    /// A new table sorted by the display string of a column. Rows with the
    /// same value keep their relative order.
    pub fn sorted_by(&self, column: &str) -> Roster {
        let mut indices: Vec<usize> = (0..self.rows.len()).collect();
        if let Some(col) = self.column_index(column) {
            indices.sort_by_key(|i| self.rows[*i][col].to_string());
        }
        self.select_rows(&indices)
    }
}
