use knn::{
    oversample, subsample_label, Diagnosis, KnnClassifier, KnnConfig, KnnError, Observation,
    Standardizer, TrainingSet,
};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn five_cells() -> TrainingSet<Diagnosis> {
    TrainingSet::new(vec![
        Observation::new(vec![-1.24, 4.7], Diagnosis::Malignant),
        Observation::new(vec![-0.29, 3.99], Diagnosis::Malignant),
        Observation::new(vec![-1.08, 2.63], Diagnosis::Benign),
        Observation::new(vec![-0.46, 2.72], Diagnosis::Benign),
        Observation::new(vec![0.64, 4.3], Diagnosis::Malignant),
    ])
    .unwrap()
}

#[test]
fn five_nearest_cells_vote_malignant() {
    let classifier = KnnClassifier::new(five_cells(), KnnConfig::new(5)).unwrap();

    let prediction = classifier.predict_votes(&[-1.0, 4.2]).unwrap();

    assert_eq!(prediction.label, Diagnosis::Malignant);
    assert_eq!(prediction.votes.get(&Diagnosis::Malignant), Some(&3));
    assert_eq!(prediction.votes.get(&Diagnosis::Benign), Some(&2));

    let expected = [0.5546, 0.7404, 1.5720, 1.5754, 1.6430];
    for (neighbour, expected) in prediction.neighbours.iter().zip(expected) {
        let distance = neighbour.distance;
        assert!((distance - expected).abs() < 1e-3, "{distance} != {expected}");
    }
}

#[test]
fn nearest_single_cell_is_malignant() {
    let classifier = KnnClassifier::new(five_cells(), KnnConfig::new(1)).unwrap();

    let neighbours = classifier.neighbours(&[-1.0, 4.2]).unwrap();

    assert_eq!(neighbours.len(), 1);
    assert_eq!(neighbours[0].index, 0);
    assert_eq!(
        classifier.predict(&[-1.0, 4.2]).unwrap(),
        Diagnosis::Malignant
    );
}

#[test]
fn configuration_errors_are_distinguishable() {
    assert!(matches!(
        KnnClassifier::new(five_cells(), KnnConfig::new(6)),
        Err(KnnError::InvalidConfiguration(_))
    ));

    let classifier = KnnClassifier::new(five_cells(), KnnConfig::new(3)).unwrap();
    assert!(matches!(
        classifier.predict(&[0.0, 0.0, 0.0]),
        Err(KnnError::DimensionMismatch {
            expected: 2,
            found: 3
        })
    ));
}

fn imbalanced_cells(rng: &mut StdRng) -> TrainingSet<Diagnosis> {
    let mut cells = Vec::new();
    for _ in 0..357 {
        let features = vec![rng.random_range(-2.0..0.5), rng.random_range(-2.0..0.5)];
        cells.push(Observation::new(features, Diagnosis::Benign));
    }
    for _ in 0..212 {
        let features = vec![rng.random_range(0.5..3.0), rng.random_range(0.5..3.0)];
        cells.push(Observation::new(features, Diagnosis::Malignant));
    }

    let cells = TrainingSet::new(cells).unwrap();
    subsample_label(&cells, &Diagnosis::Malignant, 3, rng).unwrap()
}

fn grid() -> Array2<f64> {
    let values: Vec<f64> = (0..15_u8)
        .flat_map(|i| {
            (0..15_u8).flat_map(move |j| [-3.0 + 0.4 * f64::from(i), -3.0 + 0.4 * f64::from(j)])
        })
        .collect();

    Array2::from_shape_vec((225, 2), values).unwrap()
}

#[test]
fn three_malignant_cells_never_win_with_seven_neighbours() {
    let mut rng = StdRng::seed_from_u64(2024);
    let cells = imbalanced_cells(&mut rng);

    let counts = cells.class_counts();
    assert_eq!(counts.get(&Diagnosis::Benign), Some(&357));
    assert_eq!(counts.get(&Diagnosis::Malignant), Some(&3));

    let classifier = KnnClassifier::new(cells.clone(), KnnConfig::new(7)).unwrap();
    let predictions = classifier.predict_many(grid().view()).unwrap();
    assert!(predictions.iter().all(|p| *p == Diagnosis::Benign));

    // even sitting directly on a malignant cell
    for (features, label) in cells.iter() {
        if *label == Diagnosis::Malignant {
            let query = features.to_vec();
            let prediction = classifier.predict_votes(&query).unwrap();
            assert_eq!(prediction.label, Diagnosis::Benign);
            assert!(prediction.votes.get(&Diagnosis::Benign).copied().unwrap_or(0) >= 4);
        }
    }
}

#[test]
fn oversampling_lets_the_minority_win_on_its_own_ground() {
    let mut rng = StdRng::seed_from_u64(2024);
    let cells = imbalanced_cells(&mut rng);
    let balanced = oversample(&cells, &mut rng).unwrap();

    let counts = balanced.class_counts();
    assert_eq!(counts.get(&Diagnosis::Malignant), Some(&357));

    let classifier = KnnClassifier::new(balanced, KnnConfig::new(7)).unwrap();
    for (features, label) in cells.iter() {
        if *label == Diagnosis::Malignant {
            let query = features.to_vec();
            assert_eq!(classifier.predict(&query).unwrap(), Diagnosis::Malignant);
        }
    }
}

#[test]
fn standardization_removes_scale_dominance() {
    // The second dimension is measured in much larger units; unscaled it
    // decides every ranking on its own.
    let set = TrainingSet::new(vec![
        Observation::new(vec![0.0, 1000.0], "near"),
        Observation::new(vec![0.1, 1000.0], "near"),
        Observation::new(vec![5.0, 1100.0], "far"),
        Observation::new(vec![5.1, 1100.0], "far"),
        Observation::new(vec![5.0, 1010.0], "far"),
    ])
    .unwrap();
    let query = [5.0, 1001.0];

    let raw = KnnClassifier::new(set.clone(), KnnConfig::new(1)).unwrap();
    assert_eq!(raw.predict(&query).unwrap(), "near");

    let standardizer = Standardizer::fit(&set);
    let scaled = standardizer.transform(&set).unwrap();
    let classifier = KnnClassifier::new(scaled, KnnConfig::new(1)).unwrap();
    let scaled_query = standardizer.transform_query(&query).unwrap();

    assert_eq!(
        classifier.predict(scaled_query.as_slice().unwrap()).unwrap(),
        "far"
    );
}
