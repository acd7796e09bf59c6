// Loading the rosters of a data folder.

use std::fs;
use std::path::{Path, PathBuf};

use crate::houses::io_common::{first_sheet, read_table, simplify_file_name};
use crate::houses::roster::{CellValue, Roster};
use crate::houses::*;

/// The Excel files of a folder, sorted by name. Office lock files (`~$...`)
/// are left out.
pub fn list_workbooks(folder: &Path) -> HousesResult<Vec<PathBuf>> {
    let folder_s = folder.display().to_string();
    ensure!(
        folder.is_dir(),
        MissingDataFolderSnafu {
            path: folder_s.clone()
        }
    );
    let mut res: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(folder).context(ReadingFolderSnafu {
        path: folder_s.clone(),
    })? {
        let entry = entry.context(ReadingFolderSnafu {
            path: folder_s.clone(),
        })?;
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().to_string();
        if !file_name.ends_with(".xlsx") || !path.is_file() {
            continue;
        }
        if file_name.starts_with("~$") {
            debug!("list_workbooks: skipping lock file {:?}", path);
            continue;
        }
        res.push(path);
    }
    res.sort();
    Ok(res)
}

/// Reads one roster file. Every row is tagged with the name of the file as
/// its stream.
pub fn load_workbook(path: &Path, header_row: usize) -> HousesResult<Roster> {
    info!("Attempting to read roster file {:?}", path);
    let wrange = first_sheet(path)?;
    let mut roster = read_table(&wrange, header_row);
    let stream = simplify_file_name(path);
    debug!(
        "load_workbook: {:?}: {} rows, columns {:?}",
        stream,
        roster.len(),
        roster.columns()
    );
    let tags = vec![CellValue::Text(stream); roster.len()];
    roster.set_column(STREAM_COL, tags);
    Ok(roster)
}

/// Reads and concatenates all the roster files of a folder.
pub fn load_roster(folder: &Path, header_row: usize) -> HousesResult<Roster> {
    let mut roster = Roster::default();
    for path in list_workbooks(folder)? {
        roster.append(load_workbook(&path, header_row)?);
    }
    Ok(roster)
}

pub fn check_required_columns(roster: &Roster) -> HousesResult<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !roster.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        warn!("check_required_columns: missing columns {:?}", missing);
        return MissingColumnsSnafu {
            missing,
            required: REQUIRED_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<String>>(),
        }
        .fail();
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    /// (enrollment, name, gender, semester, email)
    pub(crate) type Student<'a> = (&'a str, &'a str, &'a str, u32, &'a str);

    /// Writes a roster the way the administration sends them: a title, a
    /// blank line, then the header on the third row.
    pub(crate) fn write_roster(path: &Path, students: &[Student]) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Student list 2024").unwrap();
        let header = [
            "Enrollment No",
            "Student\nName",
            " Gender",
            "Semester",
            "Email-ID",
        ];
        for (col, h) in header.iter().enumerate() {
            sheet.write_string(2, col as u16, *h).unwrap();
        }
        for (idx, (id, name, gender, sem, email)) in students.iter().enumerate() {
            let row = (idx + 3) as u32;
            sheet.write_string(row, 0, *id).unwrap();
            sheet.write_string(row, 1, *name).unwrap();
            sheet.write_string(row, 2, *gender).unwrap();
            sheet.write_number(row, 3, *sem as f64).unwrap();
            sheet.write_string(row, 4, *email).unwrap();
        }
        workbook.save(path).unwrap();
    }

    pub(crate) fn physics_students() -> Vec<Student<'static>> {
        vec![
            ("P1", "Asha", "F", 1, "asha@uni.in"),
            ("P2", "Ravi", "M", 1, "ravi@uni.in"),
            ("P3", "Meera", "F", 1, "meera@uni.in"),
            ("P4", "Kiran", "M", 1, "kiran@uni.in"),
        ]
    }

    #[test]
    fn missing_folder() {
        let res = load_roster(Path::new("/nonexistent/Data"), 2);
        assert!(matches!(res, Err(HousesError::MissingDataFolder { .. })));
    }

    #[test]
    fn empty_folder_misses_columns() {
        let dir = tempfile::tempdir().unwrap();
        let roster = load_roster(dir.path(), 2).unwrap();
        assert!(roster.is_empty());
        match check_required_columns(&roster) {
            Err(HousesError::MissingColumns { missing, .. }) => assert_eq!(missing.len(), 5),
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn reads_and_tags_files() {
        let dir = tempfile::tempdir().unwrap();
        write_roster(&dir.path().join("Physics.xlsx"), &physics_students());
        write_roster(
            &dir.path().join("Chemistry.xlsx"),
            &[("C1", "Noor", "F", 3, "noor@uni.in")],
        );
        fs::write(dir.path().join("notes.txt"), "not a roster").unwrap();

        let roster = load_roster(dir.path(), 2).unwrap();
        check_required_columns(&roster).unwrap();
        assert_eq!(roster.len(), 5);
        assert_eq!(
            roster.columns(),
            &[
                "Enrollment No",
                "Student Name",
                "Gender",
                "Semester",
                "Email-ID",
                "Stream"
            ]
        );
        // Files are read in name order.
        assert_eq!(roster.text(0, STREAM_COL), "Chemistry");
        assert_eq!(roster.text(1, STREAM_COL), "Physics");
        assert_eq!(roster.text(0, SEMESTER_COL), "3");
        assert_eq!(roster.text(4, NAME_COL), "Kiran");
    }

    #[test]
    fn header_below_blank_rows() {
        // No title: the sheet range starts on the header row itself.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Maths.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, h) in ["Enrollment No", "Student Name", "Gender", "Semester"]
            .iter()
            .enumerate()
        {
            sheet.write_string(2, col as u16, *h).unwrap();
        }
        sheet.write_string(3, 0, "M1").unwrap();
        sheet.write_string(3, 1, "Dev").unwrap();
        sheet.write_string(3, 2, "M").unwrap();
        sheet.write_number(3, 3, 5.0).unwrap();
        sheet.write_string(5, 0, "M2").unwrap();
        sheet.write_string(5, 1, "Ila").unwrap();
        sheet.write_string(5, 2, "F").unwrap();
        sheet.write_number(5, 3, 5.0).unwrap();
        workbook.save(&path).unwrap();

        let roster = load_roster(dir.path(), 2).unwrap();
        check_required_columns(&roster).unwrap();
        // The blank row between the two students is dropped.
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.text(1, ENROLLMENT_COL), "M2");
    }

    #[test]
    fn stream_column_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Biology.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Stream").unwrap();
        sheet.write_string(1, 0, "Something else").unwrap();
        workbook.save(&path).unwrap();

        let roster = load_workbook(&path, 0).unwrap();
        assert_eq!(roster.columns(), &["Stream"]);
        assert_eq!(roster.text(0, STREAM_COL), "Biology");
    }
}
