//! This module contains models that predict the next bit in a sequence of bits.

pub mod ctw;
pub mod model;

pub use model::Model;
