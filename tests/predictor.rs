use ctw::utils::bits::parse_bits;
use ctw::{ContextTree, CtwError, Predictor};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Bernoulli, Distribution};

/// Generate 'len' bits from a memoryless source with P(1) = 'p'.
fn random_bits(len: usize, p: f64, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let source = Bernoulli::new(p).unwrap();
    (0..len).map(|_| source.sample(&mut rng) as u8).collect()
}

#[test]
fn test_predict_example() {
    let predictor = Predictor::parse("00", 1).unwrap();
    let expected = (3.0 / 8.0) / (1.0 / 2.0);
    assert_eq!(predictor.predict(0).unwrap(), expected);
    assert_eq!(predictor.predict(1).unwrap(), 1.0 - expected);
}

#[test]
fn test_seed_only() {
    let predictor = Predictor::parse("101", 3).unwrap();
    assert!(predictor.tree().is_empty());
    assert_eq!(predictor.context(), &[1, 0, 1]);
    assert_eq!(predictor.predict(1).unwrap(), 0.5);
}

#[test]
fn test_construct_folds_initial_string() {
    let predictor = Predictor::parse("0110100", 2).unwrap();
    let bits = parse_bits("0110100").unwrap();
    assert_eq!(predictor.history(), &bits[..]);
    assert_eq!(predictor.context(), &[0, 0]);
    assert_eq!(predictor.tree(), &ContextTree::compile(&bits, 2).unwrap());
}

#[test]
fn test_read_is_immutable() {
    let predictor = Predictor::parse("0011", 2).unwrap();
    let copy = predictor.clone();
    let next = predictor.read(0).unwrap();

    assert_eq!(predictor, copy);
    assert_eq!(next.history(), &[0, 0, 1, 1, 0]);
    assert_eq!(next.context(), &[1, 0]);
    assert_eq!(next.tree().elementary_count(&[1, 1], 0).unwrap(), 1);
    assert_eq!(predictor.tree().elementary_count(&[1, 1], 0).unwrap(), 0);
    assert_ne!(predictor, next);
}

#[test]
fn test_predict_does_not_commit() {
    let predictor = Predictor::parse("01101", 2).unwrap();
    let before = predictor.clone();
    let _ = predictor.predict(1).unwrap();
    let _ = predictor.predict(0).unwrap();
    assert_eq!(predictor, before);
}

#[test]
fn test_predictions_sum_to_one() {
    let bits = random_bits(200, 0.3, 7);
    for depth in [0, 1, 3, 6] {
        let mut predictor = Predictor::new(&bits[..depth], depth).unwrap();
        for &bit in &bits[depth..] {
            let p0 = predictor.predict(0).unwrap();
            let p1 = predictor.predict(1).unwrap();
            assert!(p0 > 0.0 && p1 > 0.0);
            assert!((p0 + p1 - 1.0).abs() < 1e-9);
            predictor = predictor.advance(bit).unwrap();
        }
    }
}

#[test]
fn test_sequential_cost_is_code_length() {
    // The product of the predictions is the weighted probability.
    let bits = random_bits(300, 0.8, 11);
    let mut predictor = Predictor::new(&bits[..4], 4).unwrap();
    let mut total = 0.0;
    for &bit in &bits[4..] {
        total -= predictor.predict(bit).unwrap().log2();
        predictor = predictor.read(bit).unwrap();
    }
    assert!((total - predictor.code_length()).abs() < 1e-6);
    // A biased source is cheaper than one bit per symbol.
    assert!(total < 296.0);
}

#[test]
fn test_learns_deterministic_pattern() {
    let pattern = parse_bits("0010111").unwrap();
    let bits: Vec<u8> = pattern.iter().cycle().take(700).copied().collect();
    let predictor = Predictor::new(&bits, 3).unwrap();
    // The next bit of the cycle follows "...111".
    let next = pattern[700 % pattern.len()];
    assert!(predictor.predict(next).unwrap() > 0.95);
}

#[test]
fn test_long_sequence() {
    // The weighted probability of the tree underflows, but the predictions
    // are still well defined.
    let bits = random_bits(3000, 0.5, 3);
    let predictor = Predictor::new(&bits, 4).unwrap();
    assert_eq!(ctw::ctw::tree_probability(predictor.tree()), 0.0);
    let p0 = predictor.predict(0).unwrap();
    let p1 = predictor.predict(1).unwrap();
    assert!(p0 > 0.0 && p0 < 1.0);
    assert!((p0 + p1 - 1.0).abs() < 1e-6);
    assert!(predictor.code_length() > 2000.0);
}

#[test]
fn test_all_predictors() {
    let bits = parse_bits("0110100111010010").unwrap();
    for depth in 0..5 {
        let all = Predictor::all_predictors(&bits, depth).unwrap();
        assert_eq!(all.len(), bits.len() - depth + 1);
        let snapshots: Vec<Predictor> = all.collect();
        assert_eq!(snapshots.len(), bits.len() - depth + 1);

        // The first one only holds the seed.
        assert!(snapshots[0].tree().is_empty());
        assert_eq!(snapshots[0].history(), &bits[..depth]);

        // The last one counted everything.
        let last = snapshots.last().unwrap();
        let compiled = ContextTree::compile(&bits, depth).unwrap();
        assert_eq!(last.tree(), &compiled);
        assert_eq!(last, &Predictor::new(&bits, depth).unwrap());

        // Every snapshot is one read away from the previous one.
        for (i, pair) in snapshots.windows(2).enumerate() {
            let expected = pair[0].read(bits[depth + i]).unwrap();
            assert_eq!(pair[1], expected);
        }
    }
}

#[test]
fn test_all_predictors_restarts() {
    let bits = parse_bits("01101").unwrap();
    let first: Vec<_> = Predictor::all_predictors(&bits, 2).unwrap().collect();
    let second: Vec<_> = Predictor::all_predictors(&bits, 2).unwrap().collect();
    assert_eq!(first, second);

    let mut iter = Predictor::all_predictors(&bits, 2).unwrap();
    assert_eq!(iter.len(), 4);
    iter.next();
    assert_eq!(iter.len(), 3);
    assert_eq!(iter.by_ref().count(), 3);
    assert!(iter.next().is_none());
}

#[test]
fn test_errors() {
    assert_eq!(
        Predictor::parse("0", 3),
        Err(CtwError::SeedTooShort {
            max_depth: 3,
            actual: 1
        })
    );
    assert_eq!(
        Predictor::new(&[0, 2, 1], 2),
        Err(CtwError::InvalidSymbol(2))
    );
    assert_eq!(
        Predictor::parse("01a", 1),
        Err(CtwError::InvalidCharacter {
            ch: 'a',
            position: 2
        })
    );
    assert!(Predictor::all_predictors(&[0, 1], 3).is_err());
    assert!(Predictor::all_predictors(&[0, 1, 9], 1).is_err());

    let predictor = Predictor::parse("01", 2).unwrap();
    assert_eq!(predictor.read(2), Err(CtwError::InvalidSymbol(2)));
    assert_eq!(predictor.predict(3), Err(CtwError::InvalidSymbol(3)));
}

#[test]
fn test_long_biased_history() {
    // Counts far above the exact KT range and a tree probability far below
    // the linear range.
    let mut bits = vec![0; 100_000];
    bits.extend(random_bits(4_000, 0.5, 5));
    let predictor = Predictor::new(&bits, 8).unwrap();
    assert!(predictor.code_length() > 3_000.0);

    let p0 = predictor.predict(0).unwrap();
    let p1 = predictor.predict(1).unwrap();
    assert!(p0 > 0.0 && p1 > 0.0);
    assert!((p0 + p1 - 1.0).abs() < 1e-6);

    let zeros = Predictor::new(&bits[..100_000], 8).unwrap();
    assert!(zeros.predict(0).unwrap() > 0.9999);
}
