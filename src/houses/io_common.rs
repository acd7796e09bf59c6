use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use std::path::Path;

use crate::houses::roster::{CellValue, Roster};
use crate::houses::*;

/// The name of a file without folder nor extension.
pub fn simplify_file_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Cleans up a header cell: control characters are dropped, runs of
/// whitespace (non-breaking spaces and line breaks included) become one space.
pub fn normalize_header(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_whitespace() || !c.is_control())
        .collect();
    cleaned.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// The column names of a header row. Blank headers are named after their
/// position and repeated names get a numeric suffix.
pub fn header_names(header: &[DataType], first_col: usize) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (idx, cell) in header.iter().enumerate() {
        let name = normalize_header(&cell_value(cell).to_string());
        let name = if name.is_empty() {
            format!("Unnamed: {}", first_col + idx)
        } else {
            name
        };
        let mut candidate = name.clone();
        let mut suffix = 1;
        while names.contains(&candidate) {
            candidate = format!("{}.{}", name, suffix);
            suffix += 1;
        }
        names.push(candidate);
    }
    names
}

pub fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Float(f) => CellValue::Number(*f),
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::Bool(b) => CellValue::Bool(*b),
        // Dates are kept as Excel serial numbers.
        DataType::DateTime(f) => CellValue::Number(*f),
        DataType::Error(e) => {
            debug!("cell_value: error cell {:?} read as empty", e);
            CellValue::Empty
        }
        #[allow(unreachable_patterns)]
        other => CellValue::Text(format!("{:?}", other)),
    }
}

/// Opens the first worksheet of an Excel file.
pub fn first_sheet(path: &Path) -> HousesResult<Range<DataType>> {
    let path_s = path.display().to_string();
    let mut workbook: Xlsx<_> =
        open_workbook(path).context(OpeningExcelSnafu { path: path_s.clone() })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu {
            path: path_s.clone(),
        })?
        .context(OpeningExcelSnafu { path: path_s })?;
    Ok(wrange)
}

/// Opens all the worksheets of an Excel file, in workbook order.
pub fn all_sheets(path: &Path) -> HousesResult<Vec<(String, Range<DataType>)>> {
    let path_s = path.display().to_string();
    let mut workbook: Xlsx<_> =
        open_workbook(path).context(OpeningExcelSnafu { path: path_s })?;
    Ok(workbook.worksheets())
}

/// Reads a worksheet as a table. The header sits on the absolute row
/// `header_row` of the sheet; all the rows above it are skipped, and so are
/// the rows without any content.
pub fn read_table(wrange: &Range<DataType>, header_row: usize) -> Roster {
    // calamine ranges start at the first non-empty cell, not at A1.
    let (start_row, start_col) = match wrange.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => return Roster::default(),
    };
    let skip = header_row.saturating_sub(start_row);
    let mut iter = wrange.rows().skip(skip);
    let header = match iter.next() {
        Some(h) => h,
        None => return Roster::default(),
    };
    debug!("read_table: header: {:?}", header);
    let mut roster = Roster::new(header_names(header, start_col));
    for row in iter {
        let values: Vec<CellValue> = row.iter().map(cell_value).collect();
        if values.iter().all(|v| v.is_empty()) {
            continue;
        }
        roster.push_row(values);
    }
    roster
}

/// Parses an HTML color of the form `#RRGGBB`.
pub fn parse_hex_color(color: &str) -> HousesResult<(u8, u8, u8)> {
    let hex = color.strip_prefix('#').context(InvalidColorSnafu { color })?;
    ensure!(
        hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        InvalidColorSnafu { color }
    );
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => Ok((r, g, b)),
        _ => InvalidColorSnafu { color }.fail(),
    }
}
