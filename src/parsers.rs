pub(crate) mod newick;
pub(crate) mod text;

use super::phylo::data::PayloadError;
use super::phylo::tree::TreeError;
use text::Position;
use thiserror::Error;

/// Errors found in the NEWICK text itself, before any tree is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Empty input: no tree found.")]
    EmptyInput,
    #[error("Unterminated quoted string starting at {at}.")]
    UnterminatedString { at: Position },
    #[error("Unterminated comment starting at {at}.")]
    UnterminatedComment { at: Position },
    #[error("Unterminated tag starting at {at}.")]
    UnterminatedTag { at: Position },
    #[error("Unexpected character '{character}' at {at}.")]
    UnexpectedChar { character: char, at: Position },
    #[error("Unexpected {token} at {at}.")]
    UnexpectedToken { token: String, at: Position },
    #[error("Invalid branch length '{value}' at {at}.")]
    InvalidBranchLength { value: String, at: Position },
    #[error("Unbalanced parentheses at {at}.")]
    UnbalancedParentheses { at: Position },
    #[error("Missing ';' at the end of the tree ending at {at}.")]
    MissingSemicolon { at: Position },
}

/// Everything that can go wrong while turning NEWICK text into trees.
#[derive(Debug, Error)]
pub enum TreeParseError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Conversion failed for the element at {at}: {error}")]
    Payload {
        at: Position,
        #[source]
        error: PayloadError,
    },
    #[error("Conversion of the finished tree failed: {0}")]
    Finish(PayloadError),
    #[error("Conversion of the node with index {node_index} failed: {error}")]
    Write {
        node_index: usize,
        #[source]
        error: PayloadError,
    },
    #[error(transparent)]
    Tree(#[from] TreeError),
}
