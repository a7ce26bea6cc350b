use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use ndarray::{ArrayView1, ArrayView2};
use tracing::{debug, trace, warn};

use crate::distance::Metric;
use crate::error::{KnnError, Result};
use crate::label::Label;
use crate::observation::TrainingSet;

/// Secondary ordering for observations at the same distance from the query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceTieBreak {
    /// The observation inserted into the training set first ranks first.
    #[default]
    InsertionOrder,
    /// Smaller label first, then insertion order.
    LabelOrder,
}

/// Resolution for two or more labels sharing the highest tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VoteTieBreak {
    /// The tied label owning the best-ranked neighbour wins.
    #[default]
    NearestNeighbour,
    /// The smallest tied label wins.
    LabelOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnnConfig {
    pub k: usize,
    pub metric: Metric,
    pub distance_tie_break: DistanceTieBreak,
    pub vote_tie_break: VoteTieBreak,
}

impl KnnConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            metric: Metric::default(),
            distance_tie_break: DistanceTieBreak::default(),
            vote_tie_break: VoteTieBreak::default(),
        }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_distance_tie_break(mut self, tie_break: DistanceTieBreak) -> Self {
        self.distance_tie_break = tie_break;
        self
    }

    pub fn with_vote_tie_break(mut self, tie_break: VoteTieBreak) -> Self {
        self.vote_tie_break = tie_break;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    /// Position of the observation in the training set.
    pub index: usize,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction<L> {
    pub label: L,
    pub votes: BTreeMap<L, usize>,
    /// The `k` nearest observations, closest first.
    pub neighbours: Vec<Neighbour>,
}

/// K-nearest-neighbours classifier over a shared, read-only training set.
///
/// Predictions are pure functions of the training set, the configuration and
/// the query, so one instance can serve any number of threads.
#[derive(Debug, Clone)]
pub struct KnnClassifier<L> {
    training_set: Arc<TrainingSet<L>>,
    config: KnnConfig,
}

impl<L: Label> KnnClassifier<L> {
    pub fn new(training_set: impl Into<Arc<TrainingSet<L>>>, config: KnnConfig) -> Result<Self> {
        let training_set = training_set.into();
        let n = training_set.len();

        if config.k == 0 {
            return Err(KnnError::InvalidConfiguration(
                "neighbour count k must be at least 1".to_owned(),
            ));
        }

        if config.k > n {
            return Err(KnnError::InvalidConfiguration(format!(
                "neighbour count k = {} exceeds training set size {n}",
                config.k
            )));
        }

        if config.k % 2 == 0 {
            warn!(k = config.k, "even neighbour count admits tied votes");
        }

        debug!(
            k = config.k,
            observations = n,
            dimensions = training_set.dimensions(),
            metric = ?config.metric,
            "constructed knn classifier"
        );

        Ok(Self {
            training_set,
            config,
        })
    }

    pub fn config(&self) -> &KnnConfig {
        &self.config
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    pub fn training_set(&self) -> &TrainingSet<L> {
        &self.training_set
    }

    pub fn predict(&self, query: &[f64]) -> Result<L> {
        self.predict_view(ArrayView1::from(query))
    }

    pub fn predict_votes(&self, query: &[f64]) -> Result<Prediction<L>> {
        let neighbours = self.rank(ArrayView1::from(query))?;
        let (label, votes) = self.vote(&neighbours);

        Ok(Prediction {
            label,
            votes,
            neighbours,
        })
    }

    /// The `k` nearest observations to `query`, closest first.
    pub fn neighbours(&self, query: &[f64]) -> Result<Vec<Neighbour>> {
        self.rank(ArrayView1::from(query))
    }

    /// Predicts every row of `queries`; stops at the first malformed row.
    pub fn predict_many(&self, queries: ArrayView2<f64>) -> Result<Vec<L>> {
        queries
            .rows()
            .into_iter()
            .map(|query| self.predict_view(query))
            .collect()
    }

    fn predict_view(&self, query: ArrayView1<f64>) -> Result<L> {
        let neighbours = self.rank(query)?;
        let (label, votes) = self.vote(&neighbours);

        trace!(?label, ?votes, "knn prediction");

        Ok(label)
    }

    fn rank(&self, query: ArrayView1<f64>) -> Result<Vec<Neighbour>> {
        let expected = self.training_set.dimensions();
        if query.len() != expected {
            return Err(KnnError::DimensionMismatch {
                expected,
                found: query.len(),
            });
        }

        if let Some(dimension) = query.iter().position(|value| !value.is_finite()) {
            return Err(KnnError::NonFiniteQuery { dimension });
        }

        let metric = self.config.metric;
        let mut candidates: Vec<Neighbour> = self
            .training_set
            .features()
            .rows()
            .into_iter()
            .enumerate()
            .map(|(index, observation)| Neighbour {
                index,
                distance: metric.distance(query, observation),
            })
            .collect();

        let k = self.config.k;
        let compare = |a: &Neighbour, b: &Neighbour| self.compare(a, b);

        // The comparator is a total order, so selecting then sorting the head
        // yields exactly the prefix of a full sort.
        if k < candidates.len() {
            candidates.select_nth_unstable_by(k - 1, compare);
            candidates.truncate(k);
        }
        candidates.sort_unstable_by(compare);

        Ok(candidates)
    }

    fn compare(&self, a: &Neighbour, b: &Neighbour) -> Ordering {
        let labels = self.training_set.labels();

        a.distance
            .total_cmp(&b.distance)
            .then_with(|| match self.config.distance_tie_break {
                DistanceTieBreak::InsertionOrder => Ordering::Equal,
                DistanceTieBreak::LabelOrder => labels[a.index].cmp(&labels[b.index]),
            })
            .then_with(|| a.index.cmp(&b.index))
    }

    fn vote(&self, neighbours: &[Neighbour]) -> (L, BTreeMap<L, usize>) {
        let labels = self.training_set.labels();

        // label -> (votes, rank of its closest neighbour)
        let mut tally: BTreeMap<&L, (usize, usize)> = BTreeMap::new();
        for (rank, neighbour) in neighbours.iter().enumerate() {
            tally
                .entry(&labels[neighbour.index])
                .and_modify(|(votes, _)| *votes += 1)
                .or_insert((1, rank));
        }

        // BTreeMap iterates labels in ascending order, and `min_by` keeps the
        // first of equal elements, so LabelOrder needs no extra key.
        let winner = tally
            .iter()
            .min_by(|(_, (a_votes, a_rank)), (_, (b_votes, b_rank))| {
                b_votes
                    .cmp(a_votes)
                    .then_with(|| match self.config.vote_tie_break {
                        VoteTieBreak::NearestNeighbour => a_rank.cmp(b_rank),
                        VoteTieBreak::LabelOrder => Ordering::Equal,
                    })
            })
            .map(|(label, _)| (*label).clone());

        let votes = tally
            .iter()
            .map(|(label, (count, _))| ((*label).clone(), *count))
            .collect();

        // k >= 1 is enforced at construction, so the tally is never empty.
        let label = winner.unwrap_or_else(|| labels[neighbours[0].index].clone());

        (label, votes)
    }
}
