pub use crate::config::*;

use rand::Rng;

/// A builder for adding students one at a time.
///
/// ```
/// pub use house_assignment::builder::Builder;
/// pub use house_assignment::HousePalette;
/// # use house_assignment::AssignmentErrors;
///
/// let mut builder = Builder::new(&HousePalette::default())?;
///
/// let anna = builder.add_student("Physics", "1", "F");
/// builder.add_student("Physics", "1", "M");
///
/// let res = builder.run_seeded(12)?;
/// assert!(res.houses[anna].0 < 4);
///
/// # Ok::<(), AssignmentErrors>(())
/// ```
pub struct Builder {
    pub(crate) _palette: HousePalette,
    pub(crate) _students: Vec<PartitionKey>,
}

impl Builder {
    pub fn new(palette: &HousePalette) -> Result<Builder, AssignmentErrors> {
        palette.validate()?;
        Ok(Builder {
            _palette: palette.clone(),
            _students: Vec::new(),
        })
    }

    /// Adds a student and returns its row in the assignment.
    pub fn add_student(&mut self, stream: &str, semester: &str, gender: &str) -> usize {
        self._students
            .push(PartitionKey::new(stream, semester, gender));
        self._students.len() - 1
    }

    pub fn len(&self) -> usize {
        self._students.len()
    }

    pub fn is_empty(&self) -> bool {
        self._students.is_empty()
    }

    /// Runs the pass with fresh counters.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Assignment, AssignmentErrors> {
        crate::assign_houses(
            &self._students,
            &self._palette,
            HouseCounters::new(&self._palette),
            rng,
        )
    }

    pub fn run_seeded(&self, seed: u64) -> Result<Assignment, AssignmentErrors> {
        crate::assign_houses_seeded(&self._students, &self._palette, seed)
    }
}
