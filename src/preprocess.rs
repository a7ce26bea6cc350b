//! Upstream steps the classifier expects to have run: per-dimension
//! standardization and class rebalancing.
//!
//! Sampling functions take the random source as an argument; pass a seeded
//! generator (e.g. `StdRng::seed_from_u64`) for reproducible output.

use std::collections::BTreeMap;

use ndarray::{Array1, ArrayView1, Axis};
use rand::seq::index;
use rand::Rng;
use tracing::debug;

use crate::error::{KnnError, Result};
use crate::label::Label;
use crate::observation::{Observation, TrainingSet};

/// Z-score scaling fitted on a training set: each dimension is shifted to
/// zero mean and scaled to unit (population) standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    means: Array1<f64>,
    scales: Array1<f64>,
}

impl Standardizer {
    pub fn fit<L: Label>(training_set: &TrainingSet<L>) -> Self {
        let features = training_set.features();
        let means = features
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(training_set.dimensions()));

        // A constant dimension carries no information; map it to zero.
        let scales = features
            .std_axis(Axis(0), 0.0)
            .mapv(|std_dev| if std_dev > 0.0 { std_dev } else { 1.0 });

        Self { means, scales }
    }

    pub fn means(&self) -> ArrayView1<'_, f64> {
        self.means.view()
    }

    pub fn scales(&self) -> ArrayView1<'_, f64> {
        self.scales.view()
    }

    pub fn dimensions(&self) -> usize {
        self.means.len()
    }

    pub fn transform<L: Label>(&self, training_set: &TrainingSet<L>) -> Result<TrainingSet<L>> {
        self.check_dimensions(training_set.dimensions())?;

        let scaled = (&training_set.features() - &self.means) / &self.scales;

        TrainingSet::from_parts(scaled, training_set.labels().to_vec())
    }

    pub fn transform_query(&self, query: &[f64]) -> Result<Array1<f64>> {
        self.check_dimensions(query.len())?;

        Ok((&ArrayView1::from(query) - &self.means) / &self.scales)
    }

    fn check_dimensions(&self, found: usize) -> Result<()> {
        if found == self.dimensions() {
            Ok(())
        } else {
            Err(KnnError::DimensionMismatch {
                expected: self.dimensions(),
                found,
            })
        }
    }
}

fn indices_by_label<L: Label>(training_set: &TrainingSet<L>) -> BTreeMap<&L, Vec<usize>> {
    let mut groups: BTreeMap<&L, Vec<usize>> = BTreeMap::new();
    for (index, label) in training_set.labels().iter().enumerate() {
        groups.entry(label).or_default().push(index);
    }

    groups
}

/// Brings every class up to the size of the largest one by appending
/// copies of randomly chosen (with replacement) members of that class.
///
/// The original observations stay first, in their original order; copies
/// follow grouped by label in ascending label order.
pub fn oversample<L: Label, R: Rng + ?Sized>(
    training_set: &TrainingSet<L>,
    rng: &mut R,
) -> Result<TrainingSet<L>> {
    let groups = indices_by_label(training_set);
    let target = groups.values().map(Vec::len).max().unwrap_or(0);

    let mut observations = training_set.to_observations();
    for (label, members) in &groups {
        let missing = target - members.len();
        for _ in 0..missing {
            let index = members[rng.random_range(0..members.len())];
            observations.push(observations[index].clone());
        }

        debug!(?label, copies = missing, target, "oversampled class");
    }

    TrainingSet::new(observations)
}

/// Keeps `count` randomly chosen observations labelled `label` (without
/// replacement) and every observation with another label, preserving the
/// relative order of everything kept.
pub fn subsample_label<L: Label, R: Rng + ?Sized>(
    training_set: &TrainingSet<L>,
    label: &L,
    count: usize,
    rng: &mut R,
) -> Result<TrainingSet<L>> {
    let groups = indices_by_label(training_set);
    let Some(members) = groups.get(label) else {
        return Err(KnnError::InvalidConfiguration(format!(
            "label {label:?} does not occur in the training set"
        )));
    };

    if count > members.len() {
        return Err(KnnError::InvalidConfiguration(format!(
            "cannot keep {count} observations of {label:?}, only {} present",
            members.len()
        )));
    }

    let mut keep = vec![true; training_set.len()];
    for &member in members {
        keep[member] = false;
    }
    for position in index::sample(rng, members.len(), count) {
        keep[members[position]] = true;
    }

    let observations: Vec<Observation<L>> = training_set
        .iter()
        .zip(keep)
        .filter(|(_, kept)| *kept)
        .map(|((features, label), _)| Observation::new(features.to_owned(), label.clone()))
        .collect();

    debug!(
        ?label,
        kept = count,
        dropped = members.len() - count,
        "subsampled class"
    );

    TrainingSet::new(observations)
}
