//! Errors reported by the context-tree code.

use thiserror::Error;

/// Contract violations detected at the boundary of the public API. There is
/// no I/O in the model, so every error is a caller mistake and the same input
/// always fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CtwError {
    #[error("context has length {actual}, expected exactly {expected}")]
    ContextLength { expected: usize, actual: usize },

    #[error("context has length {actual}, the tree depth is {max_depth}")]
    ContextTooLong { max_depth: usize, actual: usize },

    #[error("went too deep: no children below depth {max_depth}")]
    NoChildren { max_depth: usize },

    #[error("invalid symbol {0} (must be 0 or 1)")]
    InvalidSymbol(u8),

    #[error("invalid character {ch:?} at position {position}")]
    InvalidCharacter { ch: char, position: usize },

    #[error("negative count: {0}")]
    NegativeCount(i64),

    #[error("initial string has {actual} symbols, need at least {max_depth}")]
    SeedTooShort { max_depth: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, CtwError>;

