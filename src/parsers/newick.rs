pub(crate) mod broker;
pub(crate) mod lexer;
pub mod plugins;
pub(crate) mod reader;
pub(crate) mod writer;

use super::TreeParseError;
use crate::phylo::tree::Tree;
use reader::NewickReader;
use writer::NewickWriter;

/// Parses all NEWICK trees in `text` into [Tree]s with default payloads.
pub fn parse_newick(text: &str) -> Result<Vec<Tree>, TreeParseError> {
    NewickReader::new().read_trees(text)
}

/// Writes [Tree]s as NEWICK text, one tree per line.
pub fn write_newick(trees: &[Tree]) -> Result<String, TreeParseError> {
    NewickWriter::new().write_trees(trees)
}

/// Parses all NEWICK trees in `text` into [Tree]s with placement payloads.
///
/// Every edge needs exactly one edge-number tag like `{42}`.
pub fn parse_placement_newick(text: &str) -> Result<Vec<Tree>, TreeParseError> {
    NewickReader::placement().read_trees(text)
}

/// Writes placement [Tree]s as NEWICK text, with edge numbers as tags.
pub fn write_placement_newick(trees: &[Tree]) -> Result<String, TreeParseError> {
    NewickWriter::placement().write_trees(trees)
}
