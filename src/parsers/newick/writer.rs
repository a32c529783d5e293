use super::super::TreeParseError;
use super::broker::{NewickBroker, NewickBrokerElement};
use super::lexer::is_symbol_delimiter;
use super::plugins;
use super::reader::{DefaultNames, Step};
use crate::TreeFloat;
use crate::phylo::data::PayloadError;
use crate::phylo::edge::Edge;
use crate::phylo::node::Node;
use crate::phylo::tree::{Tree, TreeError};
use std::fmt::Debug;
use tracing::debug;

// =============================================================================
// Options
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct NewickWriterOptions {
    /// Digits after the decimal point; trailing zeros are dropped.
    pub precision: usize,
    pub quotation_mark: char,
    /// Quote every name, not only those that need it.
    pub force_quotation_marks: bool,
    pub write_names: bool,
    pub write_branch_lengths: bool,
    pub write_tags: bool,
    pub write_comments: bool,
    /// Omit names equal to the default name of the node's role.
    pub default_names: Option<DefaultNames>,
    /// Separator between trees written by [NewickWriter::write_trees].
    pub line_ending_between_trees: String,
}

impl Default for NewickWriterOptions {
    fn default() -> Self {
        Self {
            precision: 6,
            quotation_mark: '\'',
            force_quotation_marks: false,
            write_names: true,
            write_branch_lengths: true,
            write_tags: true,
            write_comments: true,
            default_names: None,
            line_ending_between_trees: "\n".to_string(),
        }
    }
}

impl NewickWriterOptions {
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_quotation_mark(mut self, quotation_mark: char) -> Self {
        self.quotation_mark = quotation_mark;
        self
    }

    pub fn with_force_quotation_marks(mut self, value: bool) -> Self {
        self.force_quotation_marks = value;
        self
    }

    pub fn with_write_names(mut self, value: bool) -> Self {
        self.write_names = value;
        self
    }

    pub fn with_write_branch_lengths(mut self, value: bool) -> Self {
        self.write_branch_lengths = value;
        self
    }

    pub fn with_write_tags(mut self, value: bool) -> Self {
        self.write_tags = value;
        self
    }

    pub fn with_write_comments(mut self, value: bool) -> Self {
        self.write_comments = value;
        self
    }

    pub fn with_default_names(mut self, names: Option<DefaultNames>) -> Self {
        self.default_names = names;
        self
    }

    pub fn with_line_ending_between_trees(
        mut self,
        line_ending: impl Into<String>,
    ) -> Self {
        self.line_ending_between_trees = line_ending.into();
        self
    }
}

// =============================================================================
// Writer
// =============================================================================

pub type NodeWriteConversion = dyn Fn(&Node, &mut NewickBrokerElement) -> Result<(), PayloadError>
    + Send
    + Sync;
pub type EdgeWriteConversion = dyn Fn(&Edge, &mut NewickBrokerElement) -> Result<(), PayloadError>
    + Send
    + Sync;

/// Turns [Tree]s into NEWICK text.
///
/// The tree is walked in post-order; the registered steps fill one broker
/// element per node, which is then rendered to text.
pub struct NewickWriter {
    options: NewickWriterOptions,
    node_steps: Vec<Step<NodeWriteConversion>>,
    edge_steps: Vec<Step<EdgeWriteConversion>>,
}

impl Default for NewickWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for NewickWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewickWriter")
            .field("options", &self.options)
            .field("node_steps", &self.node_steps)
            .field("edge_steps", &self.edge_steps)
            .finish()
    }
}

impl NewickWriter {
    pub fn new() -> Self {
        let mut writer = Self::empty();
        plugins::add_default_writer_steps(&mut writer);
        writer
    }

    /// Writer that also emits edge numbers as `{42}` tags.
    pub fn placement() -> Self {
        let mut writer = Self::new();
        plugins::add_placement_writer_steps(&mut writer);
        writer
    }

    /// Writer without any steps: only the parentheses are written.
    pub fn empty() -> Self {
        Self {
            options: NewickWriterOptions::default(),
            node_steps: Vec::new(),
            edge_steps: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: NewickWriterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &NewickWriterOptions { &self.options }

    pub fn options_mut(&mut self) -> &mut NewickWriterOptions {
        &mut self.options
    }

    pub fn add_node_step(
        &mut self,
        name: impl Into<String>,
        step: impl Fn(&Node, &mut NewickBrokerElement) -> Result<(), PayloadError>
        + Send
        + Sync
        + 'static,
    ) -> &mut Self {
        self.node_steps.push(Step { name: name.into(), run: Box::new(step) });
        self
    }

    pub fn add_edge_step(
        &mut self,
        name: impl Into<String>,
        step: impl Fn(&Edge, &mut NewickBrokerElement) -> Result<(), PayloadError>
        + Send
        + Sync
        + 'static,
    ) -> &mut Self {
        self.edge_steps.push(Step { name: name.into(), run: Box::new(step) });
        self
    }

    pub fn clear_steps(&mut self) {
        self.node_steps.clear();
        self.edge_steps.clear();
    }

    pub fn node_step_names(&self) -> Vec<&str> {
        self.node_steps.iter().map(|step| step.name.as_str()).collect()
    }

    pub fn edge_step_names(&self) -> Vec<&str> {
        self.edge_steps.iter().map(|step| step.name.as_str()).collect()
    }

    // =========================================================================
    // Writing
    // =========================================================================

    pub fn write_str(&self, tree: &Tree) -> Result<String, TreeParseError> {
        let broker = self.tree_to_broker(tree)?;
        Ok(self.broker_to_string(&broker))
    }

    /// Writes all trees, separated by the configured line ending.
    pub fn write_trees(&self, trees: &[Tree]) -> Result<String, TreeParseError> {
        let texts = trees
            .iter()
            .map(|tree| self.write_str(tree))
            .collect::<Result<Vec<String>, TreeParseError>>()?;
        debug!(trees = texts.len(), "wrote newick trees");
        Ok(texts.join(self.options.line_ending_between_trees.as_str()))
    }

    /// Runs the writer steps for every node, in post-order.
    pub fn tree_to_broker(&self, tree: &Tree) -> Result<NewickBroker, TreeParseError> {
        if tree.root_node().is_none() {
            return Err(TreeError::MissingRoot.into());
        }

        let mut broker = NewickBroker::new();
        for item in tree.postorder() {
            let node = tree
                .node(item.node_id)
                .ok_or(TreeError::NodeDoesNotExist(item.node_id))?;
            let mut element = NewickBrokerElement::new(item.depth);
            element.rank = tree.child_count(item.node_id);

            let as_write_error =
                |error: PayloadError| TreeParseError::Write {
                    node_index: node.index(),
                    error,
                };
            for step in &self.node_steps {
                (step.run)(node, &mut element).map_err(as_write_error)?;
            }
            if let Some(edge_id) = item.edge_id {
                let edge = tree
                    .edge(edge_id)
                    .ok_or(TreeError::EdgeDoesNotExist(edge_id))?;
                for step in &self.edge_steps {
                    (step.run)(edge, &mut element).map_err(as_write_error)?;
                }
            }

            if let Some(default_names) = &self.options.default_names
                && element.name == default_names.for_element(&element)
            {
                element.name.clear();
            }
            broker.push(element);
        }
        Ok(broker)
    }

    /// Renders a broker whose ranks are set.
    ///
    /// Every element closes over the `rank` subtrees rendered right before
    /// it, which is why a post-ordered broker can be rendered with a stack.
    pub fn broker_to_string(&self, broker: &NewickBroker) -> String {
        let mut stack: Vec<String> = Vec::new();
        for element in broker {
            let label = self.label(element);
            if element.rank == 0 {
                stack.push(label);
            } else {
                let children =
                    stack.split_off(stack.len().saturating_sub(element.rank));
                stack.push(format!("({}){label}", children.join(",")));
            }
        }
        let mut result = stack.join(",");
        result.push(';');
        result
    }

    fn label(&self, element: &NewickBrokerElement) -> String {
        let mut label = String::new();
        if self.options.write_names {
            label.push_str(&self.name_text(&element.name));
        }
        if self.options.write_branch_lengths
            && let Some(branch_length) = element.branch_length
        {
            label.push(':');
            label.push_str(&format_float(branch_length, self.options.precision));
        }
        if self.options.write_tags {
            for tag in &element.tags {
                label.push_str(&format!("{{{tag}}}"));
            }
        }
        if self.options.write_comments {
            for comment in &element.comments {
                label.push_str(&format!("[{comment}]"));
            }
        }
        label
    }

    fn name_text(&self, name: &str) -> String {
        let mark = self.options.quotation_mark;
        if !self.options.force_quotation_marks && !needs_quotes(name) {
            return name.to_string();
        }

        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(mark);
        for character in name.chars() {
            match character {
                '\n' => quoted.push_str("\\n"),
                '\t' => quoted.push_str("\\t"),
                '\r' => quoted.push_str("\\r"),
                '\\' => quoted.push_str("\\\\"),
                c if c == mark => {
                    quoted.push('\\');
                    quoted.push(c);
                }
                c => quoted.push(c),
            }
        }
        quoted.push(mark);
        quoted
    }
}

/// Checks if a name would not survive being read back unquoted.
fn needs_quotes(name: &str) -> bool {
    name.chars().any(|c| {
        is_symbol_delimiter(c) || matches!(c, ']' | '}' | '\'' | '"' | '\\')
    })
}

/// Fixed-point text with trailing zeros (and a trailing point) removed.
fn format_float(value: TreeFloat, precision: usize) -> String {
    let text = format!("{value:.precision$}");
    if !value.is_finite() || !text.contains('.') {
        return text;
    }
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1e0, 6), "1");
        assert_eq!(format_float(0.1, 6), "0.1");
        assert_eq!(format_float(0.1234567, 6), "0.123457");
        assert_eq!(format_float(2.4, 0), "2");
        assert_eq!(format_float(10e0, 3), "10");
        assert_eq!(format_float(-0.0000001, 6), "0");
    }

    #[test]
    fn test_quoting() {
        let writer = NewickWriter::new();
        assert_eq!(writer.name_text("A"), "A");
        assert_eq!(writer.name_text("A_B"), "A_B");
        assert_eq!(writer.name_text("A B"), "'A B'");
        assert_eq!(writer.name_text("it's"), r"'it\'s'");
        assert_eq!(writer.name_text("a:b"), "'a:b'");
        assert_eq!(writer.name_text(r"a\b"), r"'a\\b'");

        let writer = NewickWriter::new().with_options(
            NewickWriterOptions::default()
                .with_force_quotation_marks(true)
                .with_quotation_mark('"'),
        );
        assert_eq!(writer.name_text("A"), "\"A\"");
        assert_eq!(writer.name_text(""), "\"\"");
    }
}
