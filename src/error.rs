use thiserror::Error;

#[derive(Debug, Error)]
pub enum KnnError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("dimension mismatch: expected {expected} features, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("observation {index} has a non-finite value in dimension {dimension}")]
    NonFiniteFeature { index: usize, dimension: usize },

    #[error("query has a non-finite value in dimension {dimension}")]
    NonFiniteQuery { dimension: usize },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, KnnError>;
