//! Context Tree Weighting: the KT estimator, the context tree that counts
//! observations, the weighted probability computed over the tree, and the
//! predictor that ties them to a growing history.

pub mod kt;
pub mod predictor;
pub mod tree;
pub mod weighted;

pub use kt::{kt, kt_log2, kt_predict, kt_signed};
pub use predictor::{AllPredictors, Predictor};
pub use tree::{scan, ContextTree, Scan};
pub use weighted::{code_length, node_probability, tree_probability};
