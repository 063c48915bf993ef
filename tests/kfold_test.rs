use foldscore::{Error, KFold};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

#[test]
fn test_default_kfold() {
    let kfold = KFold::default();
    assert_eq!(kfold.n_splits(), 10);
    assert!(kfold.shuffle());
    assert_eq!(kfold.random_state(), None);
}

#[test]
fn test_zero_splits() {
    assert!(matches!(KFold::new(0), Err(Error::InvalidConfiguration(_))));
}

#[test]
fn test_remainder_is_excluded() {
    // 11サンプルを3分割すると2サンプルはどの分割にも入らない
    let kfold = KFold::new(3).unwrap().with_random_state(5);
    let folds = kfold.folds(11);
    let assigned: HashSet<usize> = folds.iter().flatten().copied().collect();

    assert_eq!(assigned.len(), 9);
    assert_eq!(kfold.excluded_count(11), 2);
}

#[test]
fn test_injected_rng_is_reproducible() {
    let kfold = KFold::new(4).unwrap();
    let a = kfold.split_with_rng(50, &mut StdRng::seed_from_u64(2024));
    let b = kfold.split_with_rng(50, &mut StdRng::seed_from_u64(2024));
    assert_eq!(a, b);
}

proptest! {
    #[test]
    fn prop_folds_partition_the_samples(n_samples in 0usize..300, n_splits in 1usize..25, seed in any::<u64>()) {
        let kfold = KFold::new(n_splits).unwrap().with_random_state(seed);
        let folds = kfold.folds(n_samples);
        let fold_size = n_samples / n_splits;

        prop_assert_eq!(folds.len(), n_splits);
        prop_assert!(folds.iter().all(|f| f.len() == fold_size));

        let unique: HashSet<usize> = folds.iter().flatten().copied().collect();
        prop_assert_eq!(unique.len(), n_splits * fold_size);
        prop_assert!(unique.iter().all(|&i| i < n_samples));
    }

    #[test]
    fn prop_splits_are_disjoint(n_samples in 0usize..200, n_splits in 1usize..12) {
        let splits = KFold::new(n_splits).unwrap().split(n_samples);
        prop_assert_eq!(splits.len(), n_splits);

        for split in &splits {
            let test: HashSet<usize> = split.test.iter().copied().collect();
            prop_assert_eq!(split.train.len(), n_splits - 1);
            prop_assert!(split.train_indices().all(|i| !test.contains(&i)));
            prop_assert_eq!(split.train_len() + split.test.len(), n_splits * (n_samples / n_splits));
        }
    }
}
