use proptest::collection::vec;
use proptest::prelude::*;

use pythia_core::IndexSet;
use pythia_strategies::ranking::select_by_scores;

fn pool_and_scores() -> impl Strategy<Value = (IndexSet, Vec<f64>)> {
    vec(-1e6f64..1e6, 1..40).prop_map(|scores| {
        let pool = IndexSet::from_indices(0..scores.len());
        (pool, scores)
    })
}

proptest! {
    #[test]
    fn selection_is_a_pool_subset_of_batch_size(
        (pool, scores) in pool_and_scores(),
        batch in 1usize..50,
        maximal in any::<bool>(),
    ) {
        let chosen = select_by_scores(&pool, &scores, batch, maximal).unwrap();
        prop_assert_eq!(chosen.len(), batch.min(pool.len()));
        for idx in &chosen {
            prop_assert!(pool.contains(idx));
        }
    }

    #[test]
    fn maximal_selection_dominates_the_rest(
        (pool, scores) in pool_and_scores(),
        batch in 1usize..40,
    ) {
        prop_assume!(batch < pool.len());
        let chosen = select_by_scores(&pool, &scores, batch, true).unwrap();
        let worst_chosen = chosen
            .iter()
            .map(|i| scores[i])
            .fold(f64::INFINITY, f64::min);
        for idx in &pool {
            if !chosen.contains(idx) {
                prop_assert!(scores[idx] <= worst_chosen);
            }
        }
    }

    #[test]
    fn minimal_selection_mirrors_maximal_under_negation(
        (pool, scores) in pool_and_scores(),
        batch in 1usize..40,
    ) {
        prop_assume!(batch < pool.len());
        // tied scores resolve by position, which negation reverses
        let mut sorted = scores.clone();
        sorted.sort_by(f64::total_cmp);
        sorted.dedup();
        prop_assume!(sorted.len() == scores.len());
        let bottom = select_by_scores(&pool, &scores, batch, false).unwrap();
        let negated: Vec<f64> = scores.iter().map(|s| -s).collect();
        let top_of_negated = select_by_scores(&pool, &negated, batch, true).unwrap();
        prop_assert_eq!(bottom, top_of_negated);
    }
}
