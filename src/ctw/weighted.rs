//! The weighted (CTW mixture) probability of a context tree.
//!
//! For a node 's' above the leaves:
//!
//! ```text
//! p_w(s) = (kt(s) + p_w(0s) * p_w(1s)) / 2
//! ```
//!
//! and at the leaves p_w(s) = kt(s). The recursion is evaluated from the
//! current counts on every call. A context that has no observations weighs
//! exactly one, and so does every context below it, so the walk stops there
//! and its cost is bounded by the number of nodes in the tree.

use crate::ctw::kt::{kt, kt_log2};
use crate::ctw::tree::ContextTree;
use crate::error::Result;
use crate::utils::probability::log2_average;

/// The number representation used by the recursion.
trait Domain {
    /// The probability one.
    const ONE: f64;
    /// The KT estimate of a node.
    fn estimate(zeros: u64, ones: u64) -> f64;
    /// Mix the node's own estimate with the estimates of its children.
    fn mix(own: f64, child0: f64, child1: f64) -> f64;
}

struct Linear;

impl Domain for Linear {
    const ONE: f64 = 1.0;

    fn estimate(zeros: u64, ones: u64) -> f64 {
        kt(zeros, ones)
    }

    fn mix(own: f64, child0: f64, child1: f64) -> f64 {
        (own + child0 * child1) / 2.0
    }
}

struct Log2;

impl Domain for Log2 {
    const ONE: f64 = 0.0;

    fn estimate(zeros: u64, ones: u64) -> f64 {
        kt_log2(zeros, ones)
    }

    fn mix(own: f64, child0: f64, child1: f64) -> f64 {
        log2_average(own, child0 + child1)
    }
}

/// Walk the tree below the validated 'context' and return the aggregated
/// [zeros, ones] counts of the context together with its weighted
/// probability. The counts of a node are summed from its children, so every
/// node is visited once. The recursion depth is max_depth - context.len().
fn weigh<D: Domain>(
    tree: &ContextTree,
    context: &mut Vec<u8>,
) -> ([u64; 2], f64) {
    if context.len() == tree.max_depth() {
        let counts = tree.counts_of(context);
        return (counts, D::estimate(counts[0], counts[1]));
    }
    if !tree.contains(context) {
        return ([0, 0], D::ONE);
    }

    // Extend the context by one older symbol, at the front.
    context.insert(0, 0);
    let (c0, p0) = weigh::<D>(tree, context);
    context[0] = 1;
    let (c1, p1) = weigh::<D>(tree, context);
    context.remove(0);

    let counts = [c0[0] + c1[0], c0[1] + c1[1]];
    (counts, D::mix(D::estimate(counts[0], counts[1]), p0, p1))
}

fn weigh_root<D: Domain>(tree: &ContextTree) -> f64 {
    weigh::<D>(tree, &mut Vec::with_capacity(tree.max_depth())).1
}

/// Returns the weighted probability p_w of the node 'context', which may be
/// any context no longer than the depth of the tree.
pub fn node_probability(tree: &ContextTree, context: &[u8]) -> Result<f64> {
    tree.check_context(context)?;
    Ok(weigh::<Linear>(tree, &mut context.to_vec()).1)
}

/// Returns the weighted probability of the whole counted sequence, which is
/// p_w of the root.
pub fn tree_probability(tree: &ContextTree) -> f64 {
    weigh_root::<Linear>(tree)
}

/// Same as 'node_probability' but returns log2(p_w). This does not underflow
/// on long sequences.
pub fn node_log2_probability(
    tree: &ContextTree,
    context: &[u8],
) -> Result<f64> {
    tree.check_context(context)?;
    Ok(weigh::<Log2>(tree, &mut context.to_vec()).1)
}

/// Returns log2 of the weighted probability of the root.
pub fn tree_log2_probability(tree: &ContextTree) -> f64 {
    weigh_root::<Log2>(tree)
}

/// Returns the ideal code length, in bits, of the sequence counted in 'tree'.
pub fn code_length(tree: &ContextTree) -> f64 {
    -tree_log2_probability(tree)
}

#[test]
fn test_domains_agree() {
    let bits = [0, 1, 1, 0, 1, 0, 0, 0, 1, 1, 1, 0, 1, 1, 0, 1, 0, 0, 1];
    for depth in 0..5 {
        let tree = ContextTree::compile(&bits, depth).unwrap();
        let linear = tree_probability(&tree);
        let log = tree_log2_probability(&tree);
        assert!((linear.log2() - log).abs() < 1e-9);
        assert!((code_length(&tree) + linear.log2()).abs() < 1e-9);
    }
}

#[test]
fn test_empty_tree() {
    let tree = ContextTree::new(3);
    assert_eq!(tree_probability(&tree), 1.0);
    assert_eq!(tree_log2_probability(&tree), 0.0);
    assert_eq!(node_probability(&tree, &[1, 0, 1]).unwrap(), 1.0);
}
