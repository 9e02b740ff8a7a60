//! Context Tree Weighting (CTW) prediction of binary sequences.
//!
//! The model mixes the Krichevsky–Trofimov estimates of every context length
//! from zero up to a fixed maximum depth, and turns the mixture into the
//! probability of the next bit. All the values are immutable: observing a
//! new bit returns a new tree (or predictor) and leaves the old one usable.

pub mod ctw;
pub mod error;
pub mod models;
pub mod utils;

pub use crate::ctw::{ContextTree, Predictor};
pub use crate::error::{CtwError, Result};
