use knn::{
    oversample, subsample_label, Diagnosis, KnnClassifier, KnnConfig, Observation, Standardizer,
    TrainingSet,
};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Two loose clusters in (perimeter, concavity) space.
fn synthetic_cells(
    rng: &mut StdRng,
    benign: usize,
    malignant: usize,
) -> Vec<Observation<Diagnosis>> {
    let mut cells = Vec::with_capacity(benign + malignant);

    for _ in 0..benign {
        let perimeter = rng.random_range(60.0..95.0);
        let concavity = rng.random_range(0.0..0.08);
        cells.push(Observation::new(vec![perimeter, concavity], Diagnosis::Benign));
    }

    for _ in 0..malignant {
        let perimeter = rng.random_range(85.0..160.0);
        let concavity = rng.random_range(0.06..0.3);
        cells.push(Observation::new(vec![perimeter, concavity], Diagnosis::Malignant));
    }

    cells
}

fn grid(steps: usize, from: f64, to: f64) -> Result<Array2<f64>, ndarray::ShapeError> {
    let step = (to - from) / (steps - 1) as f64;
    let values: Vec<f64> = (0..steps)
        .flat_map(|i| {
            (0..steps).flat_map(move |j| [from + i as f64 * step, from + j as f64 * step])
        })
        .collect();

    Array2::from_shape_vec((steps * steps, 2), values)
}

fn count_malignant(predictions: &[Diagnosis]) -> usize {
    predictions
        .iter()
        .filter(|&&diagnosis| diagnosis == Diagnosis::Malignant)
        .count()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // standardized (perimeter, concavity) pairs
    let five_cells = TrainingSet::new(vec![
        Observation::new(vec![-1.24, 4.7], Diagnosis::Malignant),
        Observation::new(vec![-0.29, 3.99], Diagnosis::Malignant),
        Observation::new(vec![-1.08, 2.63], Diagnosis::Benign),
        Observation::new(vec![-0.46, 2.72], Diagnosis::Benign),
        Observation::new(vec![0.64, 4.3], Diagnosis::Malignant),
    ])?;

    const QUERY: [f64; 2] = [-1.0, 4.2];
    const FIVE_NEIGHBOURS: usize = 5;

    let classifier = KnnClassifier::new(five_cells, KnnConfig::new(FIVE_NEIGHBOURS))?;
    let prediction = classifier.predict_votes(&QUERY)?;

    for neighbour in &prediction.neighbours {
        info!(
            index = neighbour.index,
            distance = neighbour.distance,
            "neighbour"
        );
    }
    println!(
        "query {QUERY:?} with k = {FIVE_NEIGHBOURS}: {} (votes {:?})",
        prediction.label, prediction.votes
    );

    const SEED: u64 = 1;
    const BENIGN_CELLS: usize = 357;
    const MALIGNANT_CELLS: usize = 212;
    const KEPT_MALIGNANT: usize = 3;
    const NEIGHBOURS: usize = 7;
    const GRID_STEPS: usize = 20;

    let mut rng = StdRng::seed_from_u64(SEED);

    let cells = TrainingSet::new(synthetic_cells(&mut rng, BENIGN_CELLS, MALIGNANT_CELLS))?;
    let imbalanced = subsample_label(&cells, &Diagnosis::Malignant, KEPT_MALIGNANT, &mut rng)?;
    info!(counts = ?imbalanced.class_counts(), "imbalanced training set");

    let standardizer = Standardizer::fit(&imbalanced);
    let scaled = standardizer.transform(&imbalanced)?;
    let queries = grid(GRID_STEPS, -3.0, 3.0)?;

    let classifier = KnnClassifier::new(scaled.clone(), KnnConfig::new(NEIGHBOURS))?;
    let predictions = classifier.predict_many(queries.view())?;
    println!(
        "imbalanced, k = {NEIGHBOURS}: {} of {} grid points predicted malignant",
        count_malignant(&predictions),
        predictions.len()
    );

    let balanced = oversample(&scaled, &mut rng)?;
    info!(counts = ?balanced.class_counts(), "oversampled training set");

    let classifier = KnnClassifier::new(balanced, KnnConfig::new(NEIGHBOURS))?;
    let predictions = classifier.predict_many(queries.view())?;
    println!(
        "oversampled, k = {NEIGHBOURS}: {} of {} grid points predicted malignant",
        count_malignant(&predictions),
        predictions.len()
    );

    Ok(())
}
