use ndarray::ArrayView1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Metric {
    #[default]
    Euclidean,
    Manhattan,
}

impl Metric {
    /// Both vectors must have the same length; callers check dimensionality
    /// before ranking.
    pub fn distance(self, first: ArrayView1<f64>, second: ArrayView1<f64>) -> f64 {
        match self {
            Self::Euclidean => euclidean(first, second),
            Self::Manhattan => manhattan(first, second),
        }
    }
}

/// Largest absolute component difference; the scale both metrics divide by
/// so that squaring neither underflows to zero nor overflows to infinity.
fn largest_difference(first: ArrayView1<f64>, second: ArrayView1<f64>) -> f64 {
    first
        .iter()
        .zip(second.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}

pub fn euclidean(first: ArrayView1<f64>, second: ArrayView1<f64>) -> f64 {
    let scale = largest_difference(first, second);
    if scale == 0.0 || scale.is_infinite() {
        return scale;
    }

    let scaled_sum: f64 = first
        .iter()
        .zip(second.iter())
        .map(|(a, b)| ((a - b) / scale).powi(2))
        .sum();

    scale * scaled_sum.sqrt()
}

pub fn manhattan(first: ArrayView1<f64>, second: ArrayView1<f64>) -> f64 {
    let scale = largest_difference(first, second);
    if scale == 0.0 || scale.is_infinite() {
        return scale;
    }

    let scaled_sum: f64 = first
        .iter()
        .zip(second.iter())
        .map(|(a, b)| ((a - b) / scale).abs())
        .sum();

    scale * scaled_sum
}
