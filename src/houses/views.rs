// The raw data page and the house distribution page.

use crate::houses::assign::{assign_roster, AssignedRoster};
use crate::houses::config_reader::HousesConfig;
use crate::houses::filters::{filter_roster, Selection};
use crate::houses::io_common::parse_hex_color;
use crate::houses::roster::Roster;
use crate::houses::*;

/// A table ready to be printed: column names and display strings.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn from_roster(roster: &Roster) -> TableView {
        TableView {
            columns: roster.columns().to_vec(),
            rows: roster
                .rows()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }
}

/// The number of students of one gender in each house.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GenderHouseCounts {
    pub gender: String,
    /// One entry per house, in palette order.
    pub counts: Vec<(String, u64)>,
}

#[derive(Debug, Clone)]
pub struct HouseDistributionPage {
    pub assigned: AssignedRoster,
    pub table: TableView,
    pub gender_counts: Vec<GenderHouseCounts>,
}

/// The columns shown by the raw view. Without an explicit request, the
/// configured default columns that exist in the roster are shown.
pub fn visible_columns(
    roster: &Roster,
    requested: &[String],
    config: &HousesConfig,
) -> Vec<String> {
    if !requested.is_empty() {
        return requested.to_vec();
    }
    let defaults: Vec<String> = config
        .default_columns
        .iter()
        .filter(|c| roster.has_column(c))
        .cloned()
        .collect();
    if defaults.is_empty() {
        roster.columns().to_vec()
    } else {
        defaults
    }
}

pub fn raw_view(
    roster: &Roster,
    selection: &Selection,
    columns: &[String],
    config: &HousesConfig,
) -> HousesResult<TableView> {
    let columns = visible_columns(roster, columns, config);
    let filtered = filter_roster(roster, selection);
    let projected = filtered.project(&columns)?;
    Ok(TableView::from_roster(&projected))
}

/// Counts the houses of each configured gender over the whole roster.
/// Genders without any student are left out.
pub fn house_counts_by_gender(
    assigned: &Roster,
    genders: &[String],
    palette: &HousePalette,
) -> HousesResult<Vec<GenderHouseCounts>> {
    ensure!(assigned.has_column(HOUSE_COL), MissingHouseColumnSnafu {});
    let mut res: Vec<GenderHouseCounts> = Vec::new();
    for gender in genders {
        let rows: Vec<usize> = (0..assigned.len())
            .filter(|idx| assigned.text(*idx, GENDER_COL) == *gender)
            .collect();
        if rows.is_empty() {
            continue;
        }
        let counts = palette
            .houses
            .iter()
            .map(|h| {
                let n = rows
                    .iter()
                    .filter(|idx| assigned.text(**idx, HOUSE_COL) == h.name)
                    .count();
                (h.name.clone(), n as u64)
            })
            .collect();
        res.push(GenderHouseCounts {
            gender: gender.clone(),
            counts,
        });
    }
    Ok(res)
}

/// Assigns the houses and builds the distribution page.
///
/// The table shows the filtered students sorted by house. The counts per
/// gender are computed over all the students.
pub fn house_distribution_page(
    roster: &Roster,
    selection: &Selection,
    seed: u64,
    config: &HousesConfig,
    palette: &HousePalette,
) -> HousesResult<HouseDistributionPage> {
    let assigned = assign_roster(roster, palette, seed)?;
    let display: Vec<String> = DISPLAY_COLUMNS.iter().map(|c| c.to_string()).collect();
    let shown = filter_roster(&assigned.roster, selection)
        .project(&display)?
        .sorted_by(HOUSE_COL);
    let gender_counts = house_counts_by_gender(&assigned.roster, &config.genders, palette)?;
    Ok(HouseDistributionPage {
        table: TableView::from_roster(&shown),
        gender_counts,
        assigned,
    })
}

fn ansi_background(color: &str) -> Option<String> {
    parse_hex_color(color)
        .ok()
        .map(|(r, g, b)| format!("\x1b[48;2;{};{};{}m\x1b[30m", r, g, b))
}

const ANSI_RESET: &str = "\x1b[0m";

/// Renders a table with aligned columns.
///
/// With `highlight`, the cells of that column are painted with the color of
/// the house they name (ANSI true color), when `color` is set.
pub fn render_table(
    table: &TableView,
    highlight: Option<(&str, &HousePalette)>,
    color: bool,
) -> String {
    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in table.rows.iter() {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(idx) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    let highlight_col = highlight.and_then(|(name, palette)| {
        table
            .columns
            .iter()
            .position(|c| c == name)
            .map(|idx| (idx, palette))
    });

    let pad = |s: &str, w: usize| format!("{}{}", s, " ".repeat(w - s.chars().count()));
    let mut out = String::new();
    let header: Vec<String> = table
        .columns
        .iter()
        .zip(widths.iter())
        .map(|(c, w)| pad(c, *w))
        .collect();
    out.push_str(header.join(" | ").trim_end());
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    for row in table.rows.iter() {
        let cells: Vec<String> = row
            .iter()
            .zip(widths.iter())
            .enumerate()
            .map(|(idx, (cell, w))| {
                let padded = pad(cell, *w);
                match highlight_col {
                    Some((col, palette)) if color && col == idx => {
                        match palette.color_of(cell).and_then(ansi_background) {
                            Some(code) => format!("{}{}{}", code, padded, ANSI_RESET),
                            None => padded,
                        }
                    }
                    _ => padded,
                }
            })
            .collect();
        out.push_str(cells.join(" | ").trim_end());
        out.push('\n');
    }
    out
}

pub fn render_gender_counts(counts: &[GenderHouseCounts]) -> String {
    let mut out = String::new();
    for gc in counts {
        out.push_str(&format!("Gender: {}\n", gc.gender));
        let table = TableView {
            columns: vec!["House".to_string(), "Count".to_string()],
            rows: gc
                .counts
                .iter()
                .map(|(h, n)| vec![h.clone(), n.to_string()])
                .collect(),
        };
        out.push_str(&render_table(&table, None, false));
    }
    out
}
