//! Error types for selector parsing

use thiserror::Error;

/// Errors while parsing an anchor selector
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("selector is empty")]
    Empty,

    #[error("unexpected '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("expected a name at offset {offset}")]
    ExpectedName { offset: usize },

    #[error("unterminated attribute selector")]
    UnterminatedAttribute,

    #[error("combinator '>' has nothing on its {side} side")]
    DanglingCombinator { side: &'static str },
}
