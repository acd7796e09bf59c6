// The house distribution workbook: one sheet per stream and gender.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::collections::BTreeMap;
use text_diff::print_diff;

use crate::houses::config_reader::HousesConfig;
use crate::houses::filters::keep_values;
use crate::houses::io_common::{all_sheets, read_table};
use crate::houses::roster::{CellValue, Roster};
use crate::houses::*;

pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const MAX_SHEET_NAME: usize = 31;
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

fn truncate(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// The sheet of a stream and a gender: at most 25 characters of the stream,
/// then at most 5 of the gender. Characters Excel refuses become `_`, and a
/// name already in `taken` gets a `~2`, `~3`... suffix.
pub fn sheet_name(stream: &str, gender: &str, taken: &[String]) -> String {
    let raw = format!("{}-{}", truncate(stream, 25), truncate(gender, 5));
    let base: String = raw
        .chars()
        .map(|c| {
            if FORBIDDEN_SHEET_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();
    let is_taken = |name: &str| taken.iter().any(|t| t.to_lowercase() == name.to_lowercase());
    if !is_taken(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let suffix = format!("~{}", n);
        let candidate = format!(
            "{}{}",
            truncate(&base, MAX_SHEET_NAME - suffix.len()),
            suffix
        );
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    match (value, format) {
        (CellValue::Empty, Some(f)) => {
            sheet.write_blank(row, col, f)?;
        }
        (CellValue::Empty, None) => {}
        (CellValue::Text(s), Some(f)) => {
            sheet.write_string_with_format(row, col, s, f)?;
        }
        (CellValue::Text(s), None) => {
            sheet.write_string(row, col, s)?;
        }
        (CellValue::Number(x), Some(f)) => {
            sheet.write_number_with_format(row, col, *x, f)?;
        }
        (CellValue::Number(x), None) => {
            sheet.write_number(row, col, *x)?;
        }
        (CellValue::Bool(b), Some(f)) => {
            sheet.write_boolean_with_format(row, col, *b, f)?;
        }
        (CellValue::Bool(b), None) => {
            sheet.write_boolean(row, col, *b)?;
        }
    }
    Ok(())
}

fn write_sheet(
    sheet: &mut Worksheet,
    table: &Roster,
    palette: &HousePalette,
) -> Result<(), XlsxError> {
    let header_format = Format::new().set_bold();
    let house_formats: BTreeMap<String, Format> = palette
        .houses
        .iter()
        .map(|h| {
            (
                h.name.clone(),
                Format::new().set_background_color(h.color.as_str()),
            )
        })
        .collect();
    let house_col = table.column_index(HOUSE_COL);

    for (col, name) in table.columns().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &header_format)?;
    }
    for (idx, row) in table.rows().enumerate() {
        let r = (idx + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            let format = if Some(col) == house_col {
                house_formats.get(&value.to_string())
            } else {
                None
            };
            write_cell(sheet, r, col as u16, value, format)?;
        }
    }
    sheet.autofit();
    Ok(())
}

/// Builds the workbook of an assigned roster.
///
/// Streams come in sorted order, genders in the configured order. Groups
/// without any student get no sheet. Each sheet lists the students sorted by
/// house.
pub fn build_workbook(
    assigned: &Roster,
    config: &HousesConfig,
    palette: &HousePalette,
) -> HousesResult<Workbook> {
    ensure!(assigned.has_column(HOUSE_COL), MissingHouseColumnSnafu {});
    let display: Vec<String> = DISPLAY_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut workbook = Workbook::new();
    let mut taken: Vec<String> = Vec::new();
    for stream in assigned.distinct_text(STREAM_COL) {
        let by_stream = keep_values(assigned, STREAM_COL, &[stream.clone()]);
        for gender in config.genders.iter() {
            let group = keep_values(&by_stream, GENDER_COL, &[gender.clone()]);
            if group.is_empty() {
                continue;
            }
            let table = group.project(&display)?.sorted_by(HOUSE_COL);
            let name = sheet_name(&stream, gender, &taken);
            debug!("build_workbook: sheet {:?}: {} students", name, table.len());
            let sheet = workbook.add_worksheet();
            sheet.set_name(&name).context(BuildingExcelSnafu {})?;
            write_sheet(sheet, &table, palette).context(BuildingExcelSnafu {})?;
            taken.push(name);
        }
    }
    if taken.is_empty() {
        warn!("build_workbook: no student to export");
    }
    Ok(workbook)
}

pub fn export_workbook(
    assigned: &Roster,
    config: &HousesConfig,
    palette: &HousePalette,
    path: &Path,
) -> HousesResult<()> {
    let mut workbook = build_workbook(assigned, config, palette)?;
    workbook.save(path).context(WritingExcelSnafu {
        path: path.display().to_string(),
    })?;
    info!("export_workbook: wrote {:?}", path);
    Ok(())
}

/// The workbook as the bytes of an xlsx file.
pub fn export_to_buffer(
    assigned: &Roster,
    config: &HousesConfig,
    palette: &HousePalette,
) -> HousesResult<Vec<u8>> {
    let mut workbook = build_workbook(assigned, config, palette)?;
    workbook.save_to_buffer().context(BuildingExcelSnafu {})
}

/// Reads back an exported workbook: the house of every enrollment number,
/// across all the sheets.
pub fn read_export(path: &Path) -> HousesResult<BTreeMap<String, String>> {
    let mut res: BTreeMap<String, String> = BTreeMap::new();
    for (sheet, wrange) in all_sheets(path)? {
        let table = read_table(&wrange, 0);
        debug!("read_export: sheet {:?}: {} rows", sheet, table.len());
        if table.is_empty() {
            continue;
        }
        ensure!(table.has_column(HOUSE_COL), MissingHouseColumnSnafu {});
        for idx in 0..table.len() {
            res.insert(
                table.text(idx, ENROLLMENT_COL),
                table.text(idx, HOUSE_COL),
            );
        }
    }
    Ok(res)
}

fn mapping_lines(mapping: &BTreeMap<String, String>) -> String {
    mapping
        .iter()
        .map(|(id, house)| format!("{}\t{}", id, house))
        .collect::<Vec<String>>()
        .join("\n")
}

/// Compares the houses of two exported workbooks. The differences are
/// printed before failing.
pub fn check_against_reference(input: &str, reference: &str) -> HousesResult<()> {
    let computed = mapping_lines(&read_export(Path::new(input))?);
    let expected = mapping_lines(&read_export(Path::new(reference))?);
    if computed != expected {
        warn!("Found differences with the reference workbook");
        print_diff(expected.as_str(), computed.as_str(), "\n");
        return ReferenceMismatchSnafu {
            path: input,
            reference,
        }
        .fail();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::houses::assign::assign_roster;
    use crate::houses::assign::tests::sample_roster;
    use crate::houses::io_loader::tests::{physics_students, write_roster};
    use crate::houses::io_loader::load_roster;

    fn strings(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn sheet_names() {
        assert_eq!(sheet_name("Physics", "F", &[]), "Physics-F");
        assert_eq!(
            sheet_name("Bachelor of Computer Applications", "Female", &[]),
            "Bachelor of Computer Appl-Femal"
        );
        assert_eq!(sheet_name("B.Sc [Hons]", "M", &[]), "B.Sc _Hons_-M");
        let taken = strings(&["Physics-F"]);
        assert_eq!(sheet_name("Physics", "F", &taken), "Physics-F~2");
        let long = sheet_name("Bachelor of Computer Applications", "Female", &[]);
        let again = sheet_name("Bachelor of Computer Applications", "Female", &[long]);
        assert_eq!(again.chars().count(), MAX_SHEET_NAME);
        assert!(again.ends_with("~2"));
    }

    #[test]
    fn workbook_needs_houses() {
        let roster = sample_roster(&[("Physics", 1, "F", 2)]);
        let res = build_workbook(&roster, &HousesConfig::default(), &HousePalette::default());
        assert!(matches!(res, Err(HousesError::MissingHouseColumn {})));
    }

    #[test]
    fn export_reads_back() {
        let palette = HousePalette::default();
        let config = HousesConfig::default();
        let roster = sample_roster(&[
            ("Physics", 1, "M", 5),
            ("Physics", 2, "F", 3),
            ("Chemistry", 1, "F", 4),
            // Not in the configured genders: left out of the workbook.
            ("Chemistry", 1, "X", 1),
        ]);
        let assigned = assign_roster(&roster, &palette, 77).unwrap().roster;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(&config.export_file_name);
        export_workbook(&assigned, &config, &palette, &path).unwrap();

        let sheets: Vec<String> = all_sheets(&path)
            .unwrap()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(sheets, strings(&["Chemistry-F", "Physics-M", "Physics-F"]));

        let read = read_export(&path).unwrap();
        assert_eq!(read.len(), 12);
        for idx in 0..assigned.len() {
            let id = assigned.text(idx, ENROLLMENT_COL);
            if assigned.text(idx, GENDER_COL) == "X" {
                assert!(!read.contains_key(&id));
            } else {
                assert_eq!(read.get(&id), Some(&assigned.text(idx, HOUSE_COL)));
            }
        }
    }

    #[test]
    fn sheets_are_sorted_by_house() {
        let palette = HousePalette::default();
        let config = HousesConfig::default();
        let roster = sample_roster(&[("Maths", 1, "M", 9)]);
        let assigned = assign_roster(&roster, &palette, 4).unwrap().roster;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        export_workbook(&assigned, &config, &palette, &path).unwrap();
        let (name, wrange) = all_sheets(&path).unwrap().remove(0);
        assert_eq!(name, "Maths-M");
        let table = read_table(&wrange, 0);
        assert_eq!(table.columns(), &DISPLAY_COLUMNS);
        let houses: Vec<String> = (0..table.len()).map(|i| table.text(i, HOUSE_COL)).collect();
        let mut sorted = houses.clone();
        sorted.sort();
        assert_eq!(houses, sorted);
        assert_eq!(table.text(0, SEMESTER_COL), "1");
    }

    #[test]
    fn buffer_is_an_xlsx_file() {
        let palette = HousePalette::default();
        let roster = sample_roster(&[("Maths", 1, "F", 2)]);
        let assigned = assign_roster(&roster, &palette, 1).unwrap().roster;
        let bytes = export_to_buffer(&assigned, &HousesConfig::default(), &palette).unwrap();
        // xlsx files are zip archives.
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn check_against_itself_and_another_seed() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("Data");
        std::fs::create_dir(&data).unwrap();
        write_roster(&data.join("Physics.xlsx"), &physics_students());
        let roster = load_roster(&data, 2).unwrap();
        let palette = HousePalette::default();
        let config = HousesConfig::default();

        let first = dir.path().join("first.xlsx");
        let same = dir.path().join("same.xlsx");
        let a = assign_roster(&roster, &palette, 10).unwrap().roster;
        export_workbook(&a, &config, &palette, &first).unwrap();
        export_workbook(&a, &config, &palette, &same).unwrap();
        check_against_reference(first.to_str().unwrap(), same.to_str().unwrap()).unwrap();

        // Swap the houses of the two girls to make a different workbook.
        let mut b = a.clone();
        let h0 = b.text(0, HOUSE_COL);
        let h2 = b.text(2, HOUSE_COL);
        let mut houses: Vec<CellValue> = (0..b.len())
            .map(|i| CellValue::Text(b.text(i, HOUSE_COL)))
            .collect();
        houses[0] = CellValue::Text(h2);
        houses[2] = CellValue::Text(h0);
        b.set_column(HOUSE_COL, houses);
        let other = dir.path().join("other.xlsx");
        export_workbook(&b, &config, &palette, &other).unwrap();
        let res = check_against_reference(other.to_str().unwrap(), first.to_str().unwrap());
        assert!(matches!(res, Err(HousesError::ReferenceMismatch { .. })));
    }
}
