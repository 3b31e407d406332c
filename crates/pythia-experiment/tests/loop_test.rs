//! End-to-end run of the active-learning loop with stub collaborators.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use pythia_core::{
    ExperimentConfig, IMetric, IModel, IOracle, IQueryStrategy, IndexSet, PythiaResult,
    SelectionContext, StopPolicy,
};
use pythia_experiment::{ActiveLearningLoop, LoopState, PoolScenario};

struct ConstantModel;

impl IModel for ConstantModel {
    fn fit(&mut self, _x: ArrayView2<'_, f64>, _y: ArrayView1<'_, f64>) -> PythiaResult<()> {
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> PythiaResult<Array1<f64>> {
        Ok(Array1::ones(x.nrows()))
    }
}

/// Always takes the first `batch_size` unlabeled indices.
struct FirstK;

impl IQueryStrategy for FirstK {
    fn name(&self) -> &str {
        "first_k"
    }

    fn select(
        &self,
        _x: ArrayView2<'_, f64>,
        _y: ArrayView1<'_, f64>,
        _labeled: &IndexSet,
        unlabeled: &IndexSet,
        batch_size: usize,
        _ctx: &SelectionContext<'_>,
    ) -> PythiaResult<IndexSet> {
        Ok(unlabeled.iter().take(batch_size).collect())
    }
}

struct ConstantOracle;

impl IOracle for ConstantOracle {
    fn query(
        &self,
        _instances: ArrayView2<'_, f64>,
        indexes: &IndexSet,
    ) -> PythiaResult<(Vec<f64>, f64)> {
        Ok((vec![1.0; indexes.len()], indexes.len() as f64))
    }
}

/// Scores 1.0 regardless of the predictions, so an empty test set is fine.
struct ConstantScore;

impl IMetric for ConstantScore {
    fn metric_name(&self) -> &str {
        "constant_score"
    }

    fn compute(
        &self,
        _y_true: ArrayView1<'_, f64>,
        _y_pred: ArrayView1<'_, f64>,
    ) -> PythiaResult<f64> {
        Ok(1.0)
    }
}

fn hundred_sample_scenario() -> PoolScenario {
    PoolScenario::builder()
        .data(Array2::<f64>::zeros((100, 3)), Array1::<f64>::zeros(100))
        .partition(
            (0..100).collect(),
            IndexSet::new(),
            (0..10).collect(),
            (10..100).collect(),
        )
        .batch_size(5)
        .model(Box::new(ConstantModel))
        .strategy(Box::new(FirstK))
        .oracle(Box::new(ConstantOracle))
        .metric(Box::new(ConstantScore))
        .build()
        .unwrap()
}

#[test]
fn three_iterations_grow_the_labeled_set_in_batches() {
    let scenario = hundred_sample_scenario();
    let config = ExperimentConfig {
        batch_size: 5,
        verbose: false,
        ..ExperimentConfig::default()
    };
    let mut al = ActiveLearningLoop::new(scenario, StopPolicy::max_iteration(3), config);
    assert_eq!(al.state(), LoopState::Init);
    let ledger = al.run(0, None).unwrap();
    assert_eq!(al.state(), LoopState::Stopped);

    assert_eq!(ledger.len(), 3);
    assert!(ledger.initial_point().is_some());

    // labeled-size progression 10 -> 15 -> 20 -> 25 through the replay
    for (iteration, expected) in [(0, 10), (1, 15), (2, 20), (3, 25)] {
        let ws = ledger.workspace(Some(iteration)).unwrap();
        assert_eq!(ws.labeled.len(), expected);
        assert_eq!(ws.labeled.len() + ws.unlabeled.len(), 100);
    }

    // workspace(0) replays the untouched initial partition
    let initial = ledger.workspace(Some(0)).unwrap();
    assert_eq!(initial.labeled, (0..10).collect());
    assert_eq!(initial.unlabeled, (10..100).collect());

    // workspace(3) matches the scenario's final sets
    let last = ledger.workspace(Some(3)).unwrap();
    assert_eq!(&last.labeled, al.scenario().labeled());
    assert_eq!(&last.unlabeled, al.scenario().unlabeled());

    // the first-k strategy walked the pool front to back
    assert_eq!(ledger.entry(0).unwrap().selected(), &(10..15).collect());
    assert_eq!(ledger.entry(2).unwrap().selected(), &(20..25).collect());

    // constant oracle charged one unit per sample
    assert!((ledger.total_cost() - 15.0).abs() < 1e-12);
    assert_eq!(ledger.queried_sample_count(), 15);
}

#[test]
fn initial_point_is_set_exactly_once() {
    let scenario = hundred_sample_scenario();
    let config = ExperimentConfig {
        batch_size: 5,
        verbose: false,
        ..ExperimentConfig::default()
    };
    let mut al = ActiveLearningLoop::new(scenario, StopPolicy::max_iteration(2), config);
    let mut ledger = al.run(0, None).unwrap();
    let point = ledger.initial_point().unwrap().to_vec();
    assert_eq!(point.len(), 1);
    // a second attempt on the returned ledger is rejected
    assert!(ledger.set_initial_point(point).is_err());
}

#[test]
fn loop_drains_a_small_pool_before_the_policy_fires() {
    let scenario = PoolScenario::builder()
        .data(Array2::<f64>::zeros((20, 3)), Array1::<f64>::zeros(20))
        .partition(
            (0..20).collect(),
            IndexSet::new(),
            (0..8).collect(),
            (8..20).collect(),
        )
        .batch_size(5)
        .model(Box::new(ConstantModel))
        .strategy(Box::new(FirstK))
        .oracle(Box::new(ConstantOracle))
        .metric(Box::new(ConstantScore))
        .build()
        .unwrap();
    let config = ExperimentConfig {
        batch_size: 5,
        verbose: false,
        ..ExperimentConfig::default()
    };
    let mut al = ActiveLearningLoop::new(scenario, StopPolicy::max_iteration(100), config);
    let ledger = al.run(0, None).unwrap();
    // 12 unlabeled, batch 5: 5 + 5 + 2
    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger.entry(2).unwrap().selected().len(), 2);
    assert!(al.scenario().unlabeled().is_empty());
    assert_eq!(al.scenario().labeled().len(), 20);
}
