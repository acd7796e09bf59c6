// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

/// A house that students can be assigned to.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct House {
    pub name: String,
    /// Display color, as an HTML hex string (`#RRGGBB`).
    pub color: String,
}

/// The ordered list of houses.
///
/// The order matters: it breaks ties when two houses have received the same
/// number of students so far.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct HousePalette {
    pub houses: Vec<House>,
}

impl HousePalette {
    /// Builds a palette from `(name, color)` pairs.
    pub fn new(houses: &[(&str, &str)]) -> Result<HousePalette, AssignmentErrors> {
        let palette = HousePalette {
            houses: houses
                .iter()
                .map(|(name, color)| House {
                    name: name.to_string(),
                    color: color.to_string(),
                })
                .collect(),
        };
        palette.validate()?;
        Ok(palette)
    }

    /// Checks that the palette can be used for an assignment pass.
    pub fn validate(&self) -> Result<(), AssignmentErrors> {
        if self.houses.is_empty() {
            return Err(AssignmentErrors::EmptyPalette);
        }
        for (idx, h) in self.houses.iter().enumerate() {
            if self.houses[..idx].iter().any(|h2| h2.name == h.name) {
                return Err(AssignmentErrors::DuplicateHouse(h.name.clone()));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.houses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.houses.is_empty()
    }

    pub fn name(&self, id: HouseId) -> &str {
        self.houses[id.0].name.as_str()
    }

    pub fn color(&self, id: HouseId) -> &str {
        self.houses[id.0].color.as_str()
    }

    pub fn color_of(&self, name: &str) -> Option<&str> {
        self.houses
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.color.as_str())
    }

    pub fn ids(&self) -> impl Iterator<Item = HouseId> {
        (0..self.houses.len()).map(HouseId)
    }
}

impl Default for HousePalette {
    fn default() -> Self {
        HousePalette {
            houses: [
                ("House A", "#FF9999"),
                ("House B", "#99CCFF"),
                ("House C", "#99FF99"),
                ("House D", "#FFCC99"),
            ]
            .iter()
            .map(|(name, color)| House {
                name: name.to_string(),
                color: color.to_string(),
            })
            .collect(),
        }
    }
}

/// Position of a house in the palette.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct HouseId(pub usize);

/// The grouping key of a student. Balance is guaranteed within each key.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct PartitionKey {
    pub stream: String,
    pub semester: String,
    pub gender: String,
}

impl PartitionKey {
    pub fn new(stream: &str, semester: &str, gender: &str) -> PartitionKey {
        PartitionKey {
            stream: stream.to_string(),
            semester: semester.to_string(),
            gender: gender.to_string(),
        }
    }
}

/// Running number of students placed in each house, per gender.
///
/// A fresh accumulator is created for every assignment pass. It is handed to
/// the pass and returned with the result.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct HouseCounters {
    num_houses: usize,
    counts: BTreeMap<String, Vec<u64>>,
}

impl HouseCounters {
    pub fn new(palette: &HousePalette) -> HouseCounters {
        HouseCounters {
            num_houses: palette.len(),
            counts: BTreeMap::new(),
        }
    }

    /// The number of students of this gender placed in the house so far.
    pub fn count(&self, gender: &str, house: HouseId) -> u64 {
        self.counts
            .get(gender)
            .and_then(|v| v.get(house.0))
            .cloned()
            .unwrap_or(0)
    }

    pub fn record(&mut self, gender: &str, house: HouseId) {
        let n = self.num_houses;
        let v = self
            .counts
            .entry(gender.to_string())
            .or_insert_with(|| vec![0; n]);
        v[house.0] += 1;
    }

    /// The houses sorted by increasing count for this gender.
    /// Houses with the same count keep the palette order.
    pub fn visit_order(&self, gender: &str) -> Vec<HouseId> {
        let mut order: Vec<HouseId> = (0..self.num_houses).map(HouseId).collect();
        order.sort_by_key(|h| self.count(gender, *h));
        order
    }

    /// All the counts for one gender, in palette order.
    pub fn totals(&self, gender: &str) -> Vec<u64> {
        (0..self.num_houses)
            .map(|idx| self.count(gender, HouseId(idx)))
            .collect()
    }

    pub fn num_houses(&self) -> usize {
        self.num_houses
    }

    pub fn genders(&self) -> impl Iterator<Item = &String> {
        self.counts.keys()
    }
}

// ******** Output data structures *********

/// The outcome of an assignment pass.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Assignment {
    /// One house per input row, in input order.
    pub houses: Vec<HouseId>,
    /// The counters after the pass.
    pub counters: HouseCounters,
}

/// Errors that prevent an assignment pass from running.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AssignmentErrors {
    EmptyPalette,
    DuplicateHouse(String),
    /// The counters were built for a palette of a different size.
    CountersMismatch { counters: usize, palette: usize },
}

impl Error for AssignmentErrors {}

impl Display for AssignmentErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentErrors::EmptyPalette => write!(f, "the house palette is empty"),
            AssignmentErrors::DuplicateHouse(name) => {
                write!(f, "the house {:?} appears more than once", name)
            }
            AssignmentErrors::CountersMismatch { counters, palette } => write!(
                f,
                "counters track {} houses but the palette has {}",
                counters, palette
            ),
        }
    }
}
