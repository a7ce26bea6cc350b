use std::collections::BTreeMap;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{KnnError, Result};
use crate::label::Label;

#[derive(Debug, Clone, PartialEq)]
pub struct Observation<L> {
    pub features: Array1<f64>,
    pub label: L,
}

impl<L> Observation<L> {
    pub fn new(features: impl Into<Array1<f64>>, label: L) -> Self {
        Self {
            features: features.into(),
            label,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.features.len()
    }
}

/// An immutable, validated collection of labelled observations.
///
/// Every row of `features` belongs to the label at the same position in
/// `labels`; rows keep their insertion order, which is also the default
/// tie-break order during ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet<L> {
    features: Array2<f64>,
    labels: Vec<L>,
}

impl<L: Label> TrainingSet<L> {
    pub fn new(observations: Vec<Observation<L>>) -> Result<Self> {
        let Some(first) = observations.first() else {
            return Err(KnnError::InvalidConfiguration(
                "training set must contain at least one observation".to_owned(),
            ));
        };

        let dimensions = first.dimensions();
        let mut values = Vec::with_capacity(observations.len() * dimensions);
        let mut labels = Vec::with_capacity(observations.len());

        for observation in observations {
            if observation.dimensions() != dimensions {
                return Err(KnnError::DimensionMismatch {
                    expected: dimensions,
                    found: observation.dimensions(),
                });
            }

            values.extend(observation.features.iter().copied());
            labels.push(observation.label);
        }

        let features = Array2::from_shape_vec((labels.len(), dimensions), values)?;

        Self::from_parts(features, labels)
    }

    /// Builds a set from a row-per-observation feature matrix and its labels.
    pub fn from_parts(features: Array2<f64>, labels: Vec<L>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(KnnError::InvalidConfiguration(format!(
                "{} feature rows but {} labels",
                features.nrows(),
                labels.len()
            )));
        }

        if labels.is_empty() {
            return Err(KnnError::InvalidConfiguration(
                "training set must contain at least one observation".to_owned(),
            ));
        }

        if features.ncols() == 0 {
            return Err(KnnError::InvalidConfiguration(
                "feature vectors must have at least one dimension".to_owned(),
            ));
        }

        for (index, row) in features.rows().into_iter().enumerate() {
            if let Some(dimension) = row.iter().position(|value| !value.is_finite()) {
                return Err(KnnError::NonFiniteFeature { index, dimension });
            }
        }

        Ok(Self { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    pub fn observation(&self, index: usize) -> Option<(ArrayView1<'_, f64>, &L)> {
        let label = self.labels.get(index)?;

        Some((self.features.row(index), label))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArrayView1<'_, f64>, &L)> {
        self.features.rows().into_iter().zip(self.labels.iter())
    }

    pub fn class_counts(&self) -> BTreeMap<L, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }

        counts
    }

    pub fn to_observations(&self) -> Vec<Observation<L>> {
        self.iter()
            .map(|(features, label)| Observation::new(features.to_owned(), label.clone()))
            .collect()
    }
}
