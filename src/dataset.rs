use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::types::{SampleId, SplitAssignment};

// Slack allowed when checking that the ratios do not exceed 1
const RATIO_EPSILON: f64 = 1e-6;

/// Fractions of the dataset assigned to train, val and test.
///
/// Test always receives the remainder after train and val are taken, so its
/// ratio only takes part in validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatios {
    train: f64,
    val: f64,
    test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.64,
            val: 0.16,
            test: 0.2,
        }
    }
}

impl SplitRatios {
    pub fn new(train: f64, val: f64, test: f64) -> Result<Self> {
        let invalid = |reason| Error::InvalidRatios {
            train,
            val,
            test,
            reason,
        };
        if [train, val, test]
            .iter()
            .any(|r| !r.is_finite() || !(0.0..=1.0).contains(r))
        {
            return Err(invalid("every ratio must be between 0.0 and 1.0"));
        }
        if train + val + test > 1.0 + RATIO_EPSILON {
            return Err(invalid("ratios must not sum to more than 1.0"));
        }
        Ok(Self { train, val, test })
    }

    pub fn train(&self) -> f64 {
        self.train
    }

    pub fn val(&self) -> f64 {
        self.val
    }

    pub fn test(&self) -> f64 {
        self.test
    }
}

/// Build the RNG used for shuffling; without a seed every run differs.
pub fn shuffle_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Shuffle the ids and cut them into train, val and test.
///
/// `n_train = floor(train * n)`, `n_val = floor(val * n)`, test gets the rest.
pub fn split_ids<R: Rng + ?Sized>(
    mut ids: Vec<SampleId>,
    ratios: &SplitRatios,
    rng: &mut R,
) -> SplitAssignment {
    ids.shuffle(rng);

    let n = ids.len();
    let n_train = ((ratios.train * n as f64).floor() as usize).min(n);
    let n_val = ((ratios.val * n as f64).floor() as usize).min(n - n_train);

    let test = ids.split_off(n_train + n_val);
    let val = ids.split_off(n_train);

    SplitAssignment {
        train: ids,
        val,
        test,
    }
}

/// A dataset convention that can be split into train/val/test folders.
///
/// [`Splitter::split`] runs the stages in their fixed order: read the dataset,
/// discover ids, shuffle, then write the subsets.
pub trait Splitter {
    /// Check the source layout before anything is written.
    fn read_dataset(&mut self) -> Result<()>;

    /// Discover the sample ids of the dataset.
    fn get_ids(&self) -> Result<Vec<SampleId>>;

    fn shuffle_train_test(&mut self, ids: Vec<SampleId>) -> SplitAssignment;

    /// Materialize the assignment on disk.
    fn write_dataset(&self, assignment: &SplitAssignment) -> Result<()>;

    fn split(&mut self) -> Result<SplitAssignment> {
        self.read_dataset()?;
        let ids = self.get_ids()?;
        let assignment = self.shuffle_train_test(ids);
        self.write_dataset(&assignment)?;
        Ok(assignment)
    }
}
