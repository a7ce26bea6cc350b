pub mod classifier;
pub mod distance;
pub mod error;
pub mod label;
pub mod observation;
pub mod preprocess;

pub use crate::classifier::{
    DistanceTieBreak, KnnClassifier, KnnConfig, Neighbour, Prediction, VoteTieBreak,
};
pub use crate::distance::Metric;
pub use crate::error::{KnnError, Result};
pub use crate::label::{Diagnosis, Label};
pub use crate::observation::{Observation, TrainingSet};
pub use crate::preprocess::{oversample, subsample_label, Standardizer};
