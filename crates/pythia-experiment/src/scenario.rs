//! The pool-based scenario: data, index partitions, and collaborators.

use ndarray::{Array1, Array2, Axis};
use tracing::debug;

use pythia_core::{
    ExperimentConfig, IMetric, IModel, IOracle, IQueryStrategy, IndexSet, Ledger, MetricValue,
    PythiaError, PythiaResult, SelectionContext,
};

/// Owns the feature matrix, the (partially known) label vector, the four
/// index sets, and the boxed collaborators of one active-learning run.
///
/// The labeled and unlabeled sets stay disjoint at all times; only
/// [`PoolScenario::update_labeled_data`] moves indices between them.
pub struct PoolScenario {
    x: Array2<f64>,
    y: Array1<f64>,
    train_idx: IndexSet,
    test_idx: IndexSet,
    labeled: IndexSet,
    unlabeled: IndexSet,
    batch_size: usize,
    model: Box<dyn IModel>,
    strategy: Box<dyn IQueryStrategy>,
    oracle: Box<dyn IOracle>,
    metrics: Vec<Box<dyn IMetric>>,
}

impl std::fmt::Debug for PoolScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolScenario")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("train_idx", &self.train_idx)
            .field("test_idx", &self.test_idx)
            .field("labeled", &self.labeled)
            .field("unlabeled", &self.unlabeled)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

/// Collects the scenario's parts and validates them on `build`.
#[derive(Default)]
pub struct PoolScenarioBuilder {
    x: Option<Array2<f64>>,
    y: Option<Array1<f64>>,
    train_idx: Option<IndexSet>,
    test_idx: Option<IndexSet>,
    labeled: Option<IndexSet>,
    unlabeled: Option<IndexSet>,
    batch_size: usize,
    model: Option<Box<dyn IModel>>,
    strategy: Option<Box<dyn IQueryStrategy>>,
    oracle: Option<Box<dyn IOracle>>,
    metrics: Vec<Box<dyn IMetric>>,
}

impl PoolScenarioBuilder {
    pub fn data(mut self, x: Array2<f64>, y: Array1<f64>) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn partition(
        mut self,
        train_idx: IndexSet,
        test_idx: IndexSet,
        labeled: IndexSet,
        unlabeled: IndexSet,
    ) -> Self {
        self.train_idx = Some(train_idx);
        self.test_idx = Some(test_idx);
        self.labeled = Some(labeled);
        self.unlabeled = Some(unlabeled);
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn model(mut self, model: Box<dyn IModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn strategy(mut self, strategy: Box<dyn IQueryStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn oracle(mut self, oracle: Box<dyn IOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn metric(mut self, metric: Box<dyn IMetric>) -> Self {
        self.metrics.push(metric);
        self
    }

    pub fn build(self) -> PythiaResult<PoolScenario> {
        let x = self.x.ok_or(PythiaError::MissingComponent { name: "data" })?;
        let y = self.y.ok_or(PythiaError::MissingComponent { name: "data" })?;
        let train_idx = self
            .train_idx
            .ok_or(PythiaError::MissingComponent { name: "partition" })?;
        let test_idx = self
            .test_idx
            .ok_or(PythiaError::MissingComponent { name: "partition" })?;
        let labeled = self
            .labeled
            .ok_or(PythiaError::MissingComponent { name: "partition" })?;
        let unlabeled = self
            .unlabeled
            .ok_or(PythiaError::MissingComponent { name: "partition" })?;
        let model = self
            .model
            .ok_or(PythiaError::MissingComponent { name: "model" })?;
        let strategy = self
            .strategy
            .ok_or(PythiaError::MissingComponent { name: "strategy" })?;
        let oracle = self
            .oracle
            .ok_or(PythiaError::MissingComponent { name: "oracle" })?;
        if self.metrics.is_empty() {
            return Err(PythiaError::EmptyMetrics);
        }
        if self.batch_size == 0 {
            return Err(PythiaError::InvalidBatchSize {
                batch_size: self.batch_size,
            });
        }
        if y.len() != x.nrows() {
            return Err(PythiaError::ShapeMismatch {
                expected: format!("{} labels", x.nrows()),
                actual: format!("{} labels", y.len()),
            });
        }
        // labeled + unlabeled must partition train; train + test must cover
        // every sample exactly once.
        let partition_ok = labeled.len() + unlabeled.len() == train_idx.len()
            && train_idx.len() + test_idx.len() == x.nrows()
            && labeled.iter().all(|i| train_idx.contains(i))
            && unlabeled.iter().all(|i| train_idx.contains(i))
            && labeled.iter().all(|i| !unlabeled.contains(i));
        if !partition_ok {
            return Err(PythiaError::PartitionMismatch {
                labeled: labeled.len(),
                unlabeled: unlabeled.len(),
                expected: train_idx.len(),
            });
        }
        Ok(PoolScenario {
            x,
            y,
            train_idx,
            test_idx,
            labeled,
            unlabeled,
            batch_size: self.batch_size,
            model,
            strategy,
            oracle,
            metrics: self.metrics,
        })
    }
}

impl PoolScenario {
    pub fn builder() -> PoolScenarioBuilder {
        PoolScenarioBuilder::default()
    }

    /// Fresh ledger seeded from the scenario's current index sets.
    pub fn init_iteration(&self, round: usize, config: &ExperimentConfig) -> PythiaResult<Ledger> {
        let names = self.metrics.iter().map(|m| m.metric_name().to_string()).collect();
        Ok(Ledger::new(
            round,
            self.train_idx.clone(),
            self.test_idx.clone(),
            self.labeled.clone(),
            self.unlabeled.clone(),
            names,
        )?
        .with_verbosity(config.verbose, config.print_interval))
    }

    /// Fit the model on the labeled subset, predict on the test subset,
    /// and score every declared metric in order.
    pub fn execute_labeled_training(
        &mut self,
        pool: Option<&rayon::ThreadPool>,
    ) -> PythiaResult<(Array1<f64>, Vec<MetricValue>)> {
        let train_x = self.x.select(Axis(0), self.labeled.as_slice());
        let train_y = self.y.select(Axis(0), self.labeled.as_slice());
        let test_x = self.x.select(Axis(0), self.test_idx.as_slice());
        let test_y = self.y.select(Axis(0), self.test_idx.as_slice());
        // Installing into the pool lets a rayon-aware model fan its
        // matrix work out without changing the one-call-per-phase shape.
        let predictions = match pool {
            Some(pool) => pool.install(|| {
                self.model.fit(train_x.view(), train_y.view())?;
                self.model.predict(test_x.view())
            })?,
            None => {
                self.model.fit(train_x.view(), train_y.view())?;
                self.model.predict(test_x.view())?
            }
        };
        let mut perf = Vec::with_capacity(self.metrics.len());
        for metric in &self.metrics {
            let value = metric.compute(test_y.view(), predictions.view())?;
            perf.push(MetricValue::scalar(metric.metric_name(), value));
        }
        Ok((predictions, perf))
    }

    /// Ask the strategy for at most `batch_size` unlabeled indices.
    ///
    /// A pool no larger than the batch is returned whole without
    /// consulting the strategy.
    pub fn select_instances(
        &self,
        pool: Option<&rayon::ThreadPool>,
    ) -> PythiaResult<IndexSet> {
        if self.unlabeled.len() <= self.batch_size {
            return Ok(self.unlabeled.clone());
        }
        let ctx = SelectionContext::new(Some(self.model.as_ref()), pool);
        let selected = self.strategy.select(
            self.x.view(),
            self.y.view(),
            &self.labeled,
            &self.unlabeled,
            self.batch_size,
            &ctx,
        )?;
        debug!(
            strategy = self.strategy.name(),
            selected = selected.len(),
            "instances selected"
        );
        Ok(selected)
    }

    /// Query the oracle for `selected` and splice the returned labels into
    /// the label vector at their positions.
    pub fn label_instances(&mut self, selected: &IndexSet) -> PythiaResult<(Vec<f64>, f64)> {
        let instances = self.x.select(Axis(0), selected.as_slice());
        let (labels, cost) = self.oracle.query(instances.view(), selected)?;
        if labels.len() != selected.len() {
            return Err(PythiaError::ShapeMismatch {
                expected: format!("{} labels", selected.len()),
                actual: format!("{} labels", labels.len()),
            });
        }
        for (idx, &label) in selected.iter().zip(labels.iter()) {
            self.y[idx] = label;
        }
        Ok((labels, cost))
    }

    /// Move `selected` from the unlabeled to the labeled set. Must run
    /// exactly once per iteration, after [`PoolScenario::label_instances`].
    pub fn update_labeled_data(&mut self, selected: &IndexSet) {
        self.labeled.update(selected.iter());
        self.unlabeled.difference_update(selected.iter());
    }

    pub fn remaining_unlabeled_instances(&self) -> bool {
        !self.unlabeled.is_empty()
    }

    pub fn labeled(&self) -> &IndexSet {
        &self.labeled
    }

    pub fn unlabeled(&self) -> &IndexSet {
        &self.unlabeled
    }

    pub fn model(&self) -> &dyn IModel {
        self.model.as_ref()
    }

    pub fn labels(&self) -> &Array1<f64> {
        &self.y
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}
