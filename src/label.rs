use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use thiserror::Error;

/// Anything usable as a class token: comparable, hashable and ordered so that
/// vote ties can fall back to a fixed label order.
pub trait Label: Clone + Eq + Hash + Ord + Debug {}

impl<T> Label for T where T: Clone + Eq + Hash + Ord + Debug {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Diagnosis {
    Benign,
    Malignant,
}

impl Diagnosis {
    pub fn opposite(self) -> Self {
        match self {
            Self::Malignant => Self::Benign,
            Self::Benign => Self::Malignant,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Malignant => "M",
            Self::Benign => "B",
        }
    }
}

impl Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected diagnosis {0}")]
pub struct UnknownDiagnosis(pub String);

impl FromStr for Diagnosis {
    type Err = UnknownDiagnosis;

    fn from_str(diagnosis: &str) -> Result<Self, Self::Err> {
        match diagnosis {
            "M" => Ok(Self::Malignant),
            "B" => Ok(Self::Benign),
            val => Err(UnknownDiagnosis(val.to_owned())),
        }
    }
}
