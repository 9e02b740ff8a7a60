//! The persistent binary context tree.
//!
//! Raw observation counts live only in the leaves, at exactly 'max_depth'.
//! The counts of shorter contexts are derived by summing the leaves below
//! them. A context is read with the most recent symbol last, and the tree
//! grows to the left: the children of the context 'c' are '0c' and '1c'.
//! Descending from the root therefore follows the context from its last
//! symbol to its first one.
//!
//! Trees are immutable. 'increment' copies the path from the root to the
//! modified leaf and shares every other node with the original tree.

use std::sync::Arc;

use crate::error::{CtwError, Result};
use crate::utils::check_symbol;

#[derive(Debug, PartialEq, Eq)]
enum Node {
    /// Counts of zeros and ones observed in the context of this leaf.
    Leaf([u64; 2]),
    /// Subtrees for the contexts that extend this one with 0 and 1.
    Inner([Option<Arc<Node>>; 2]),
}

/// A mapping from contexts of length 'max_depth' to the number of zeros and
/// ones that followed them. A node is allocated only when a leaf below it
/// holds a non-zero count, so two trees with the same counts have the same
/// shape, and the derived equality is equality of the count mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextTree {
    max_depth: usize,
    root: Option<Arc<Node>>,
}

impl ContextTree {
    /// Create an empty tree with leaves at depth 'max_depth'.
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            root: None,
        }
    }

    /// Builds the tree of observation counts for the sequence 'bits'. The
    /// first 'max_depth' bits only serve as context.
    pub fn compile(bits: &[u8], max_depth: usize) -> Result<Self> {
        let mut tree = Self::new(max_depth);
        for (context, observation) in scan(bits, max_depth) {
            tree = tree.increment(context, observation)?;
        }
        Ok(tree)
    }

    /// Same as 'compile', with the seed context and the observed stream
    /// passed separately. The seed must have exactly 'max_depth' bits.
    pub fn compile_from(seed: &[u8], stream: &[u8]) -> Result<Self> {
        let mut bits = Vec::with_capacity(seed.len() + stream.len());
        bits.extend_from_slice(seed);
        bits.extend_from_slice(stream);
        Self::compile(&bits, seed.len())
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns true if nothing was counted yet.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    fn check_leaf_context(&self, context: &[u8]) -> Result<()> {
        if context.len() != self.max_depth {
            return Err(CtwError::ContextLength {
                expected: self.max_depth,
                actual: context.len(),
            });
        }
        Self::check_bits(context)
    }

    /// Check that 'context' can name a node of this tree.
    pub(crate) fn check_context(&self, context: &[u8]) -> Result<()> {
        if context.len() > self.max_depth {
            return Err(CtwError::ContextTooLong {
                max_depth: self.max_depth,
                actual: context.len(),
            });
        }
        Self::check_bits(context)
    }

    fn check_bits(context: &[u8]) -> Result<()> {
        for &bit in context {
            check_symbol(bit)?;
        }
        Ok(())
    }

    /// Return a new tree where the count of 'observation' in the leaf
    /// 'context' is one higher. 'self' is not modified.
    pub fn increment(&self, context: &[u8], observation: u8) -> Result<Self> {
        self.check_leaf_context(context)?;
        let observation = check_symbol(observation)?;
        Ok(self.bumped(context, observation))
    }

    /// Same as 'increment', for a context and an observation that are known
    /// to be valid.
    pub(crate) fn bumped(&self, context: &[u8], observation: u8) -> Self {
        debug_assert_eq!(context.len(), self.max_depth);
        debug_assert!(observation < 2);
        let root = Self::bump(self.root.as_deref(), context, observation);
        Self {
            max_depth: self.max_depth,
            root: Some(root),
        }
    }

    /// Copy the path to the leaf 'path' (consumed from its end) and bump the
    /// counter of 'observation' in the new leaf.
    fn bump(node: Option<&Node>, path: &[u8], observation: u8) -> Arc<Node> {
        match path.split_last() {
            None => {
                let mut counts = match node {
                    Some(Node::Leaf(counts)) => *counts,
                    _ => {
                        debug_assert!(node.is_none(), "Inner node at a leaf");
                        [0, 0]
                    }
                };
                counts[observation as usize] += 1;
                Arc::new(Node::Leaf(counts))
            }
            Some((&last, rest)) => {
                let mut children = match node {
                    Some(Node::Inner(children)) => children.clone(),
                    _ => {
                        debug_assert!(node.is_none(), "Leaf above leaf depth");
                        [None, None]
                    }
                };
                let idx = last as usize;
                let child = children[idx].as_deref();
                children[idx] = Some(Self::bump(child, rest, observation));
                Arc::new(Node::Inner(children))
            }
        }
    }

    /// Find the node of 'context', if anything was counted under it.
    fn find(&self, context: &[u8]) -> Option<&Node> {
        let mut node = self.root.as_deref()?;
        for &bit in context.iter().rev() {
            match node {
                Node::Inner(children) => {
                    node = children.get(bit as usize)?.as_deref()?;
                }
                Node::Leaf(_) => return None,
            }
        }
        Some(node)
    }

    /// Returns the raw count stored in the leaf 'context', or zero.
    pub fn elementary_count(
        &self,
        context: &[u8],
        observation: u8,
    ) -> Result<u64> {
        self.check_leaf_context(context)?;
        let observation = check_symbol(observation)?;
        match self.find(context) {
            Some(Node::Leaf(counts)) => Ok(counts[observation as usize]),
            _ => Ok(0),
        }
    }

    /// Returns the number of times 'observation' followed 'context'. For
    /// contexts shorter than 'max_depth' this is the sum over the leaves
    /// below the context.
    pub fn count(&self, context: &[u8], observation: u8) -> Result<u64> {
        self.check_context(context)?;
        let observation = check_symbol(observation)?;
        if context.len() == self.max_depth {
            return self.elementary_count(context, observation);
        }
        Ok(Self::subtree_count(self.find(context), observation))
    }

    /// Returns the aggregated [zeros, ones] counts of a context that was
    /// already validated with 'check_context'.
    pub(crate) fn counts_of(&self, context: &[u8]) -> [u64; 2] {
        debug_assert!(self.check_context(context).is_ok());
        let node = self.find(context);
        [Self::subtree_count(node, 0), Self::subtree_count(node, 1)]
    }

    /// Returns true if something was counted under 'context'.
    pub(crate) fn contains(&self, context: &[u8]) -> bool {
        self.find(context).is_some()
    }

    /// Sum the counts of 'observation' over the leaves of the subtree.
    fn subtree_count(node: Option<&Node>, observation: u8) -> u64 {
        match node {
            None => 0,
            Some(Node::Leaf(counts)) => counts[observation as usize],
            Some(Node::Inner(children)) => children
                .iter()
                .map(|c| Self::subtree_count(c.as_deref(), observation))
                .sum(),
        }
    }

    /// Returns the two contexts that extend 'context' by one older symbol.
    pub fn children(&self, context: &[u8]) -> Result<[Vec<u8>; 2]> {
        if context.len() >= self.max_depth {
            return Err(CtwError::NoChildren {
                max_depth: self.max_depth,
            });
        }
        let extend = |bit: u8| {
            let mut child = Vec::with_capacity(context.len() + 1);
            child.push(bit);
            child.extend_from_slice(context);
            child
        };
        Ok([extend(0), extend(1)])
    }

    /// Returns the total number of observations in the tree.
    pub fn total(&self) -> u64 {
        let root = self.root.as_deref();
        Self::subtree_count(root, 0) + Self::subtree_count(root, 1)
    }

    /// Returns every leaf that holds a non-zero count, as (context, [zeros,
    /// ones]) pairs, sorted by context.
    pub fn leaves(&self) -> Vec<(Vec<u8>, [u64; 2])> {
        let mut leaves = Vec::new();
        let mut path = Vec::with_capacity(self.max_depth);
        Self::collect_leaves(self.root.as_deref(), &mut path, &mut leaves);
        leaves.sort();
        leaves
    }

    fn collect_leaves(
        node: Option<&Node>,
        path: &mut Vec<u8>,
        leaves: &mut Vec<(Vec<u8>, [u64; 2])>,
    ) {
        match node {
            None => {}
            Some(Node::Leaf(counts)) => {
                // The path was recorded from the most recent symbol.
                let context = path.iter().rev().copied().collect();
                leaves.push((context, *counts));
            }
            Some(Node::Inner(children)) => {
                for (bit, child) in children.iter().enumerate() {
                    path.push(bit as u8);
                    Self::collect_leaves(child.as_deref(), path, leaves);
                    path.pop();
                }
            }
        }
    }
}

/// Scans a bit sequence and yields all (context, observation) pairs, where
/// the context is the window of 'max_depth' bits before the observation.
pub struct Scan<'a> {
    bits: &'a [u8],
    max_depth: usize,
    pos: usize,
}

/// Returns an iterator over the (context, observation) pairs of 'bits'.
pub fn scan(bits: &[u8], max_depth: usize) -> Scan<'_> {
    Scan {
        bits,
        max_depth,
        pos: max_depth,
    }
}

impl<'a> Iterator for Scan<'a> {
    type Item = (&'a [u8], u8);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.bits.len() {
            return None;
        }
        let context = &self.bits[self.pos - self.max_depth..self.pos];
        let observation = self.bits[self.pos];
        self.pos += 1;
        Some((context, observation))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.bits.len().saturating_sub(self.pos);
        (left, Some(left))
    }
}

impl<'a> ExactSizeIterator for Scan<'a> {}

#[test]
fn test_scan_pairs() {
    let bits = [0, 1, 1, 0, 1, 0];
    let pairs: Vec<_> = scan(&bits, 3).collect();
    let expected: [(&[u8], u8); 3] =
        [(&[0, 1, 1], 0), (&[1, 1, 0], 1), (&[1, 0, 1], 0)];
    assert_eq!(pairs, expected);
    assert_eq!(scan(&bits, 3).len(), 3);

    // Too short to observe anything.
    assert_eq!(scan(&bits[..2], 3).count(), 0);
    assert_eq!(scan(&bits[..3], 3).count(), 0);
}

#[test]
fn test_shared_structure() {
    let t0 = ContextTree::new(2);
    let t1 = t0.increment(&[0, 1], 1).unwrap();
    let t2 = t1.increment(&[1, 0], 0).unwrap();

    let subtree = |t: &ContextTree, bit: usize| match t.root.as_deref() {
        Some(Node::Inner(children)) => children[bit].clone(),
        _ => None,
    };
    // Only the path of the context '10' was copied. The subtree of the
    // context '1' is shared between the two trees.
    assert!(subtree(&t1, 0).is_none());
    assert!(subtree(&t2, 0).is_some());
    let (a, b) = (subtree(&t1, 1).unwrap(), subtree(&t2, 1).unwrap());
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(t0.total(), 0);
    assert_eq!(t1.total(), 1);
    assert_eq!(t2.total(), 2);
}

#[test]
fn test_depth_zero() {
    let tree = ContextTree::compile(&[1, 1, 0], 0).unwrap();
    assert_eq!(tree.elementary_count(&[], 0).unwrap(), 1);
    assert_eq!(tree.elementary_count(&[], 1).unwrap(), 2);
    assert_eq!(tree.count(&[], 1).unwrap(), 2);
    assert!(tree.children(&[]).is_err());
    assert_eq!(tree.leaves(), vec![(vec![], [1, 2])]);
}
