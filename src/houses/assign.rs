use house_assignment::{assign_houses_seeded, HouseCounters, PartitionKey};

use crate::houses::roster::{CellValue, Roster};
use crate::houses::*;

/// A roster with its `House` column, and the counters of the pass that
/// filled it.
#[derive(Debug, Clone)]
pub struct AssignedRoster {
    pub roster: Roster,
    pub counters: HouseCounters,
    pub seed: u64,
}

/// The partition key of every row, from the display strings of the
/// stream, semester and gender cells.
pub fn partition_keys(roster: &Roster) -> Vec<PartitionKey> {
    (0..roster.len())
        .map(|idx| {
            PartitionKey::new(
                &roster.text(idx, STREAM_COL),
                &roster.text(idx, SEMESTER_COL),
                &roster.text(idx, GENDER_COL),
            )
        })
        .collect()
}

/// Assigns a house to every student of the roster.
///
/// Each call starts from fresh counters. Two calls with the same seed give
/// the same houses, two calls with different seeds usually do not.
pub fn assign_roster(
    roster: &Roster,
    palette: &HousePalette,
    seed: u64,
) -> HousesResult<AssignedRoster> {
    let keys = partition_keys(roster);
    let assignment = assign_houses_seeded(&keys, palette, seed).context(AssignmentSnafu {})?;
    let houses: Vec<CellValue> = assignment
        .houses
        .iter()
        .map(|h| CellValue::text(palette.name(*h)))
        .collect();
    let mut res = roster.clone();
    res.set_column(HOUSE_COL, houses);
    debug!("assign_roster: assigned {} students", res.len());
    Ok(AssignedRoster {
        roster: res,
        counters: assignment.counters,
        seed,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    pub(crate) fn sample_roster(groups: &[(&str, u32, &str, usize)]) -> Roster {
        let mut r = Roster::new(
            [ENROLLMENT_COL, NAME_COL, GENDER_COL, STREAM_COL, SEMESTER_COL]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        );
        let mut n = 0;
        for (stream, sem, gender, count) in groups {
            for _ in 0..*count {
                n += 1;
                r.push_row(vec![
                    CellValue::Text(format!("E{:04}", n)),
                    CellValue::Text(format!("Student {}", n)),
                    CellValue::text(gender),
                    CellValue::text(stream),
                    CellValue::Number(*sem as f64),
                ]);
            }
        }
        r
    }

    #[test]
    fn every_row_gets_a_palette_house() {
        let palette = HousePalette::default();
        let roster = sample_roster(&[
            ("Physics", 1, "M", 9),
            ("Physics", 1, "F", 5),
            ("Chemistry", 3, "F", 7),
        ]);
        let assigned = assign_roster(&roster, &palette, 5).unwrap();
        assert_eq!(assigned.roster.len(), roster.len());
        for idx in 0..assigned.roster.len() {
            let house = assigned.roster.text(idx, HOUSE_COL);
            assert!(palette.color_of(&house).is_some(), "{:?}", house);
        }
    }

    #[test]
    fn balanced_per_group() {
        let palette = HousePalette::default();
        let roster = sample_roster(&[
            ("Physics", 1, "M", 13),
            ("Physics", 2, "M", 6),
            ("Physics", 1, "F", 3),
            ("Maths", 1, "F", 10),
        ]);
        let assigned = assign_roster(&roster, &palette, 11).unwrap().roster;
        let mut counts: HashMap<(String, String, String), HashMap<String, u64>> = HashMap::new();
        for idx in 0..assigned.len() {
            let key = (
                assigned.text(idx, STREAM_COL),
                assigned.text(idx, SEMESTER_COL),
                assigned.text(idx, GENDER_COL),
            );
            *counts
                .entry(key)
                .or_default()
                .entry(assigned.text(idx, HOUSE_COL))
                .or_default() += 1;
        }
        for (key, by_house) in counts {
            let per_house: Vec<u64> = palette
                .houses
                .iter()
                .map(|h| by_house.get(&h.name).cloned().unwrap_or(0))
                .collect();
            let max = per_house.iter().max().unwrap();
            let min = per_house.iter().min().unwrap();
            assert!(max - min <= 1, "{:?}: {:?}", key, per_house);
        }
    }

    #[test]
    fn physics_scenario() {
        let palette = HousePalette::default();
        let roster = sample_roster(&[("Physics", 1, "M", 2), ("Physics", 1, "F", 2)]);
        let assigned = assign_roster(&roster, &palette, 2024).unwrap().roster;
        let houses: Vec<String> = (0..4).map(|i| assigned.text(i, HOUSE_COL)).collect();
        assert!(houses.iter().all(|h| !h.is_empty()));
        // Two students of the same gender never share a house here.
        assert_ne!(houses[0], houses[1]);
        assert_ne!(houses[2], houses[3]);
    }

    #[test]
    fn physics_file_scenario() {
        use crate::houses::io_loader::tests::{physics_students, write_roster};
        use crate::houses::io_loader::{check_required_columns, load_roster};

        let dir = tempfile::tempdir().unwrap();
        write_roster(&dir.path().join("Physics.xlsx"), &physics_students());
        let roster = load_roster(dir.path(), 2).unwrap();
        check_required_columns(&roster).unwrap();

        let palette = HousePalette::default();
        let assigned = assign_roster(&roster, &palette, 31).unwrap();
        let r = &assigned.roster;
        assert_eq!(r.len(), 4);
        let house_of = |id: &str| {
            let idx = (0..r.len())
                .find(|i| r.text(*i, ENROLLMENT_COL) == id)
                .unwrap();
            r.text(idx, HOUSE_COL)
        };
        // P1 and P3 are the girls, P2 and P4 the boys.
        assert_ne!(house_of("P1"), house_of("P3"));
        assert_ne!(house_of("P2"), house_of("P4"));
        assert_eq!(assigned.counters.totals("F").iter().sum::<u64>(), 2);
        assert_eq!(assigned.counters.totals("M").iter().sum::<u64>(), 2);
    }

    #[test]
    fn seed_makes_it_reproducible() {
        let palette = HousePalette::default();
        let roster = sample_roster(&[("Physics", 1, "M", 20), ("Physics", 1, "F", 20)]);
        let a = assign_roster(&roster, &palette, 1).unwrap();
        let b = assign_roster(&roster, &palette, 1).unwrap();
        assert_eq!(a.roster, b.roster);
        assert_eq!(a.counters, b.counters);
    }

    #[test]
    fn blank_genders_still_get_a_house() {
        let palette = HousePalette::default();
        let mut roster = sample_roster(&[("Physics", 1, "M", 1)]);
        roster.push_row(vec![CellValue::text("E9999"), CellValue::text("Sam")]);
        let assigned = assign_roster(&roster, &palette, 3).unwrap().roster;
        assert!(!assigned.text(1, HOUSE_COL).is_empty());
    }
}
