mod config;
pub mod builder;
pub mod manual;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use std::collections::BTreeMap;

pub use crate::config::*;

/// Runs one assignment pass over the students.
///
/// Arguments:
/// * `keys` the partition key of every student, in row order
/// * `palette` the houses to distribute the students into
/// * `counters` the accumulator for this pass. It biases the order in which
/// the houses are visited towards the least filled ones for each gender.
/// * `rng` the source of randomness for the shuffles
///
/// Within each partition the houses are visited in a round-robin, so the
/// counts of two houses never differ by more than one inside a partition.
pub fn assign_houses<R: Rng + ?Sized>(
    keys: &[PartitionKey],
    palette: &HousePalette,
    counters: HouseCounters,
    rng: &mut R,
) -> Result<Assignment, AssignmentErrors> {
    palette.validate()?;
    if counters.num_houses() != palette.len() {
        return Err(AssignmentErrors::CountersMismatch {
            counters: counters.num_houses(),
            palette: palette.len(),
        });
    }
    info!(
        "assign_houses: processing {:?} students over {:?} houses",
        keys.len(),
        palette.len()
    );

    // Partitions are visited in sorted key order.
    let mut partitions: BTreeMap<&PartitionKey, Vec<usize>> = BTreeMap::new();
    for (idx, key) in keys.iter().enumerate() {
        partitions.entry(key).or_default().push(idx);
    }

    let mut counters = counters;
    let mut houses: Vec<Option<HouseId>> = vec![None; keys.len()];
    for (key, rows) in partitions.iter_mut() {
        rows.shuffle(rng);
        let order = counters.visit_order(&key.gender);
        debug!(
            "assign_houses: partition {:?}: {} students, visit order {:?}",
            key,
            rows.len(),
            order
        );
        for (i, row) in rows.iter().enumerate() {
            let house = order[i % order.len()];
            houses[*row] = Some(house);
            counters.record(&key.gender, house);
        }
    }

    // Every row belongs to exactly one partition.
    let houses: Vec<HouseId> = houses.into_iter().flatten().collect();
    assert_eq!(houses.len(), keys.len());

    for gender in counters.genders() {
        info!(
            "assign_houses: gender {:?}: totals {:?}",
            gender,
            counters.totals(gender)
        );
    }
    Ok(Assignment { houses, counters })
}

/// Runs an assignment pass with fresh counters and a generator seeded from
/// `seed`. The same inputs and seed always give the same houses.
pub fn assign_houses_seeded(
    keys: &[PartitionKey],
    palette: &HousePalette,
    seed: u64,
) -> Result<Assignment, AssignmentErrors> {
    let mut rng = StdRng::seed_from_u64(seed);
    assign_houses(keys, palette, HouseCounters::new(palette), &mut rng)
}
