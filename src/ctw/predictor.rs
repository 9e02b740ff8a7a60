//! The incremental predictor, which binds the observed history to the
//! context tree that counts it.

use crate::ctw::tree::ContextTree;
use crate::ctw::weighted::code_length;
use crate::ctw::weighted::{tree_log2_probability, tree_probability};
use crate::error::{CtwError, Result};
use crate::utils::bits::{format_bits, parse_bits};
use crate::utils::check_symbol;
use crate::utils::probability::is_representable;

/// Below this log2 probability the linear weighting is not attempted, since
/// it would underflow.
const LINEAR_LOG2_LIMIT: f64 = -1000.0;

/// A snapshot of the model after observing 'history'. Predictors are
/// immutable: 'read' returns a new predictor and leaves this one usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predictor {
    /// Every symbol observed so far, starting with the seed context.
    history: Vec<u8>,
    /// The length of the contexts.
    max_depth: usize,
    /// The counts of every (context, observation) pair in 'history'.
    tree: ContextTree,
}

impl Predictor {
    /// Create a predictor from the bits 'initial'. The first 'max_depth'
    /// bits are the seed context and the rest are observed right away.
    pub fn new(initial: &[u8], max_depth: usize) -> Result<Self> {
        if initial.len() < max_depth {
            return Err(CtwError::SeedTooShort {
                max_depth,
                actual: initial.len(),
            });
        }
        let tree = ContextTree::compile(initial, max_depth)?;
        // With nothing to observe, 'compile' never looks at the seed.
        for &bit in &initial[..max_depth] {
            check_symbol(bit)?;
        }
        Ok(Self {
            history: initial.to_vec(),
            max_depth,
            tree,
        })
    }

    /// Same as 'new' but takes the bits as a string of '0' and '1'.
    pub fn parse(initial: &str, max_depth: usize) -> Result<Self> {
        Self::new(&parse_bits(initial)?, max_depth)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn history(&self) -> &[u8] {
        &self.history
    }

    pub fn tree(&self) -> &ContextTree {
        &self.tree
    }

    /// Returns the last 'max_depth' symbols of the history.
    pub fn context(&self) -> &[u8] {
        let start = self.history.len().saturating_sub(self.max_depth);
        &self.history[start..]
    }

    /// Returns a new predictor that has also observed 'symbol'.
    pub fn read(&self, symbol: u8) -> Result<Self> {
        let symbol = check_symbol(symbol)?;
        Ok(self.step(symbol))
    }

    /// Same as 'read', but consumes the predictor and reuses its history
    /// buffer.
    pub fn advance(mut self, symbol: u8) -> Result<Self> {
        let symbol = check_symbol(symbol)?;
        self.push(symbol);
        Ok(self)
    }

    /// Create the predictor of a seed context of valid bits, with nothing
    /// observed yet.
    pub(crate) fn seeded(seed: Vec<u8>) -> Self {
        let max_depth = seed.len();
        Self {
            history: seed,
            max_depth,
            tree: ContextTree::new(max_depth),
        }
    }

    /// Observe the valid bit 'symbol' in place.
    pub(crate) fn push(&mut self, symbol: u8) {
        self.tree = self.tree.bumped(self.context(), symbol);
        self.history.push(symbol);
    }

    fn step(&self, symbol: u8) -> Self {
        let tree = self.tree.bumped(self.context(), symbol);
        let mut history = Vec::with_capacity(self.history.len() + 1);
        history.extend_from_slice(&self.history);
        history.push(symbol);
        Self {
            history,
            max_depth: self.max_depth,
            tree,
        }
    }

    /// Returns the probability that the next symbol is 'symbol', given the
    /// history. This is the ratio of the weighted probability of the tree
    /// with and without the hypothetical observation. The predictor itself
    /// is not changed.
    pub fn predict(&self, symbol: u8) -> Result<f64> {
        let symbol = check_symbol(symbol)?;
        Ok(self.probability_of(symbol))
    }

    /// Same as 'predict', for a symbol that is known to be valid.
    pub(crate) fn probability_of(&self, symbol: u8) -> f64 {
        let next = self.tree.bumped(self.context(), symbol);
        let before_log = tree_log2_probability(&self.tree);
        if before_log > LINEAR_LOG2_LIMIT {
            let before = tree_probability(&self.tree);
            let after = tree_probability(&next);
            if is_representable(before) && is_representable(after) {
                return after / before;
            }
        }

        // The probabilities underflow. Take the ratio in the log domain.
        log::trace!(
            "Predicting in the log domain after {} symbols",
            self.history.len()
        );
        (tree_log2_probability(&next) - before_log).exp2()
    }

    /// Returns the ideal code length, in bits, of everything observed after
    /// the seed context.
    pub fn code_length(&self) -> f64 {
        code_length(&self.tree)
    }

    /// Returns every predictor on the way through 'bits': the predictor of
    /// the seed context (the first 'max_depth' bits) and then one more per
    /// observed bit. All bits are validated before the first snapshot.
    pub fn all_predictors(
        bits: &[u8],
        max_depth: usize,
    ) -> Result<AllPredictors<'_>> {
        if bits.len() < max_depth {
            return Err(CtwError::SeedTooShort {
                max_depth,
                actual: bits.len(),
            });
        }
        for &bit in bits {
            check_symbol(bit)?;
        }
        Ok(AllPredictors {
            bits,
            max_depth,
            pos: max_depth,
            current: None,
        })
    }
}

impl std::fmt::Display for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Predictor(depth={}, seen={}, context={})",
            self.max_depth,
            self.history.len(),
            format_bits(self.context())
        )
    }
}

/// An iterator over the successive predictors of a bit sequence. Created by
/// 'Predictor::all_predictors'.
pub struct AllPredictors<'a> {
    bits: &'a [u8],
    max_depth: usize,
    /// The next bit to read.
    pos: usize,
    /// The last predictor that was returned.
    current: Option<Predictor>,
}

impl<'a> Iterator for AllPredictors<'a> {
    type Item = Predictor;

    fn next(&mut self) -> Option<Predictor> {
        let next = match &self.current {
            None => Predictor::seeded(self.bits[..self.max_depth].to_vec()),
            Some(prev) => {
                let &symbol = self.bits.get(self.pos)?;
                self.pos += 1;
                prev.step(symbol)
            }
        };
        self.current = Some(next.clone());
        Some(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let mut left = self.bits.len() - self.pos;
        if self.current.is_none() {
            left += 1;
        }
        (left, Some(left))
    }
}

impl<'a> ExactSizeIterator for AllPredictors<'a> {}

#[test]
fn test_advance_matches_read() {
    let p = Predictor::parse("0110", 2).unwrap();
    let read = p.read(1).unwrap().read(0).unwrap();
    let advanced = p.clone().advance(1).unwrap().advance(0).unwrap();
    assert_eq!(read, advanced);
    assert_eq!(advanced.context(), &[1, 0]);
    assert_eq!(p.history(), &[0, 1, 1, 0]);
    assert!(p.clone().advance(2).is_err());
}

#[test]
fn test_display() {
    let p = Predictor::parse("00101", 3).unwrap();
    assert_eq!(p.to_string(), "Predictor(depth=3, seen=5, context=101)");
}

#[test]
fn test_values_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Predictor>();
    assert_send_sync::<ContextTree>();
}
