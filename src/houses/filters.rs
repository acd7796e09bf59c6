use crate::houses::roster::Roster;
use crate::houses::*;

/// The values picked in the filter widgets of a page.
///
/// An empty list on a dimension means that this dimension is not filtered.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Selection {
    pub streams: Vec<String>,
    pub semesters: Vec<String>,
    pub genders: Vec<String>,
}

/// A single-choice gender filter.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum GenderChoice {
    All,
    Only(String),
}

impl GenderChoice {
    pub fn parse(s: &str) -> GenderChoice {
        match s.trim() {
            "" | "All" | "all" => GenderChoice::All,
            g => GenderChoice::Only(g.to_string()),
        }
    }
}

/// Keeps the rows whose value in `column` is one of `values`.
/// All the rows are kept when `values` is empty.
pub fn keep_values(roster: &Roster, column: &str, values: &[String]) -> Roster {
    if values.is_empty() {
        return roster.clone();
    }
    let indices: Vec<usize> = (0..roster.len())
        .filter(|idx| values.contains(&roster.text(*idx, column)))
        .collect();
    roster.select_rows(&indices)
}

pub fn filter_roster(roster: &Roster, selection: &Selection) -> Roster {
    let r = keep_values(roster, STREAM_COL, &selection.streams);
    let r = keep_values(&r, SEMESTER_COL, &selection.semesters);
    let r = keep_values(&r, GENDER_COL, &selection.genders);
    debug!(
        "filter_roster: {:?}: {} -> {} rows",
        selection,
        roster.len(),
        r.len()
    );
    r
}

pub fn filter_gender(roster: &Roster, choice: &GenderChoice) -> Roster {
    match choice {
        GenderChoice::All => roster.clone(),
        GenderChoice::Only(g) => keep_values(roster, GENDER_COL, &[g.clone()]),
    }
}
