use super::super::text::Position;
use super::super::{ParseError, TreeParseError};
use super::broker::{NewickBroker, NewickBrokerElement};
use super::lexer::{NewickLexer, Token, TokenKind};
use super::plugins;
use crate::TreeFloat;
use crate::phylo::data::{EdgeData, NodeData, PayloadError, PayloadKind};
use crate::phylo::node::NodeId;
use crate::phylo::tree::Tree;
use std::fmt::Debug;
use tracing::{debug, trace};

// =============================================================================
// Options
// =============================================================================

/// Names given to unnamed nodes, by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultNames {
    pub leaf: String,
    pub internal: String,
    pub root: String,
}

impl Default for DefaultNames {
    fn default() -> Self {
        Self {
            leaf: "Leaf Node".to_string(),
            internal: "Internal Node".to_string(),
            root: "Root Node".to_string(),
        }
    }
}

impl DefaultNames {
    /// The default name for an element in the role it has in its tree.
    pub fn for_element(&self, element: &NewickBrokerElement) -> &str {
        if element.is_root() {
            &self.root
        } else if element.is_leaf() {
            &self.leaf
        } else {
            &self.internal
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct NewickReaderOptions {
    /// Turn `_` into spaces in unquoted names.
    pub replace_name_underscores: bool,
    pub default_names: Option<DefaultNames>,
}

impl NewickReaderOptions {
    pub fn with_replace_name_underscores(mut self, value: bool) -> Self {
        self.replace_name_underscores = value;
        self
    }

    pub fn with_default_names(mut self, names: Option<DefaultNames>) -> Self {
        self.default_names = names;
        self
    }
}

// =============================================================================
// Conversion steps
// =============================================================================

pub type NodeDataFactory = dyn Fn() -> NodeData + Send + Sync;
pub type EdgeDataFactory = dyn Fn() -> EdgeData + Send + Sync;
pub type NodeConversion = dyn Fn(&NewickBrokerElement, &mut NodeData) -> Result<(), PayloadError>
    + Send
    + Sync;
pub type EdgeConversion = dyn Fn(&NewickBrokerElement, &mut EdgeData) -> Result<(), PayloadError>
    + Send
    + Sync;
pub type FinishConversion = dyn Fn(&Tree) -> Result<(), PayloadError> + Send + Sync;

/// A named entry in one of the reader's ordered step lists.
pub struct Step<F: ?Sized> {
    pub name: String,
    pub run: Box<F>,
}

impl<F: ?Sized> Debug for Step<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Step({})", self.name)
    }
}

// =============================================================================
// Reader
// =============================================================================

/// Turns NEWICK text into [Tree]s.
///
/// Parsing produces a [NewickBroker]; the tree is then assembled from it,
/// running every registered step for every element in registration order.
/// The data factories decide which payload variant nodes and edges get.
pub struct NewickReader {
    options: NewickReaderOptions,
    node_data_factory: Box<NodeDataFactory>,
    edge_data_factory: Box<EdgeDataFactory>,
    node_steps: Vec<Step<NodeConversion>>,
    edge_steps: Vec<Step<EdgeConversion>>,
    finish_steps: Vec<Step<FinishConversion>>,
}

impl Default for NewickReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for NewickReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewickReader")
            .field("options", &self.options)
            .field("node_steps", &self.node_steps)
            .field("edge_steps", &self.edge_steps)
            .field("finish_steps", &self.finish_steps)
            .finish()
    }
}

impl NewickReader {
    /// Reader for default payloads: names and branch lengths.
    pub fn new() -> Self {
        let mut reader = Self::with_payload(PayloadKind::Default);
        plugins::add_default_reader_steps(&mut reader);
        reader
    }

    /// Reader for placement trees: every edge needs an edge-number tag.
    pub fn placement() -> Self {
        let mut reader = Self::with_payload(PayloadKind::Placement);
        plugins::add_default_reader_steps(&mut reader);
        plugins::add_placement_reader_steps(&mut reader);
        reader
    }

    /// Reader that creates payloads of the given kind and has no steps.
    pub fn with_payload(kind: PayloadKind) -> Self {
        Self {
            options: NewickReaderOptions::default(),
            node_data_factory: Box::new(move || kind.new_node_data()),
            edge_data_factory: Box::new(move || kind.new_edge_data()),
            node_steps: Vec::new(),
            edge_steps: Vec::new(),
            finish_steps: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: NewickReaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &NewickReaderOptions { &self.options }

    pub fn options_mut(&mut self) -> &mut NewickReaderOptions {
        &mut self.options
    }

    // =========================================================================
    // Pipeline registration
    // =========================================================================

    pub fn set_node_data_factory(
        &mut self,
        factory: impl Fn() -> NodeData + Send + Sync + 'static,
    ) -> &mut Self {
        self.node_data_factory = Box::new(factory);
        self
    }

    pub fn set_edge_data_factory(
        &mut self,
        factory: impl Fn() -> EdgeData + Send + Sync + 'static,
    ) -> &mut Self {
        self.edge_data_factory = Box::new(factory);
        self
    }

    pub fn add_node_step(
        &mut self,
        name: impl Into<String>,
        step: impl Fn(&NewickBrokerElement, &mut NodeData) -> Result<(), PayloadError>
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
        step: impl Fn(&NewickBrokerElement, &mut EdgeData) -> Result<(), PayloadError>
        + Send
        + Sync
        + 'static,
    ) -> &mut Self {
        self.edge_steps.push(Step { name: name.into(), run: Box::new(step) });
        self
    }

    /// Adds a check that runs once on the completed tree.
    pub fn add_finish_step(
        &mut self,
        name: impl Into<String>,
        step: impl Fn(&Tree) -> Result<(), PayloadError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.finish_steps.push(Step { name: name.into(), run: Box::new(step) });
        self
    }

    /// Removes all steps; the data factories stay.
    pub fn clear_steps(&mut self) {
        self.node_steps.clear();
        self.edge_steps.clear();
        self.finish_steps.clear();
    }

    pub fn node_step_names(&self) -> Vec<&str> {
        self.node_steps.iter().map(|step| step.name.as_str()).collect()
    }

    pub fn edge_step_names(&self) -> Vec<&str> {
        self.edge_steps.iter().map(|step| step.name.as_str()).collect()
    }

    pub fn finish_step_names(&self) -> Vec<&str> {
        self.finish_steps.iter().map(|step| step.name.as_str()).collect()
    }

    // =========================================================================
    // Reading
    // =========================================================================

    /// Reads exactly one tree. Anything but whitespace after its `;` is an
    /// error.
    pub fn read_str(&self, text: &str) -> Result<Tree, TreeParseError> {
        let mut tree = Tree::new();
        self.read_into(text, &mut tree)?;
        Ok(tree)
    }

    /// Clears `tree` and reads exactly one tree into it.
    ///
    /// On failure `tree` is left empty.
    pub fn read_into(
        &self,
        text: &str,
        tree: &mut Tree,
    ) -> Result<(), TreeParseError> {
        tree.clear();
        let broker = self.read_broker(text)?;
        self.broker_to_tree(broker, tree)
    }

    /// Reads all consecutive `;`-terminated trees.
    pub fn read_trees(&self, text: &str) -> Result<Vec<Tree>, TreeParseError> {
        let mut lexer = NewickLexer::new(text);
        let mut trees: Vec<Tree> = Vec::new();
        while let Some(broker) = parse_broker(&mut lexer, &self.options)? {
            let mut tree = Tree::new();
            self.broker_to_tree(broker, &mut tree)?;
            trees.push(tree);
        }
        if trees.is_empty() {
            return Err(ParseError::EmptyInput.into());
        }
        debug!(trees = trees.len(), "read newick trees");
        Ok(trees)
    }

    /// Parses the text of exactly one tree without assembling it.
    pub fn read_broker(&self, text: &str) -> Result<NewickBroker, ParseError> {
        let mut lexer = NewickLexer::new(text);
        let mut broker = parse_broker(&mut lexer, &self.options)?
            .ok_or(ParseError::EmptyInput)?;
        broker.assign_ranks();
        if let Some(token) = lexer.next() {
            let Token { kind, at } = token?;
            return Err(ParseError::UnexpectedToken { token: kind.to_string(), at });
        }
        Ok(broker)
    }

    // =========================================================================
    // Assembly
    // =========================================================================

    /// Builds the tree described by `broker` into the empty `tree`.
    ///
    /// Elements are linked parent first with an explicit stack, so the
    /// nesting depth of the input is not limited by the call stack. If any
    /// step fails, `tree` is cleared before the error is returned.
    pub fn broker_to_tree(
        &self,
        mut broker: NewickBroker,
        tree: &mut Tree,
    ) -> Result<(), TreeParseError> {
        broker.validate()?;
        broker.assign_ranks();
        if let Some(default_names) = &self.options.default_names {
            for index in 0..broker.len() {
                let element = &broker[index];
                if element.name.is_empty() {
                    let name = default_names.for_element(element).to_string();
                    broker[index].name = name;
                }
            }
        }

        debug!(
            elements = broker.len(),
            leaves = broker.leaf_count(),
            max_rank = broker.max_rank(),
            "assembling newick tree"
        );

        let result = self.assemble(&broker, tree);
        if result.is_err() {
            tree.clear();
        }
        result
    }

    fn assemble(
        &self,
        broker: &NewickBroker,
        tree: &mut Tree,
    ) -> Result<(), TreeParseError> {
        let children = broker.child_indices();
        let root_index = broker.len() - 1;
        let root_element = &broker[root_index];
        if root_element.branch_length.is_some() {
            trace!("branch length of the root element has no edge and is ignored");
        }

        let root_data = self.node_data(root_element)?;
        let root_node_id = tree.add_root(root_data)?;

        let mut stack: Vec<(usize, NodeId)> = children[root_index]
            .iter()
            .rev()
            .map(|&child| (child, root_node_id))
            .collect();

        while let Some((index, parent_node_id)) = stack.pop() {
            let element = &broker[index];
            let node_data = self.node_data(element)?;
            let edge_data = self.edge_data(element)?;
            let (node_id, _) =
                tree.add_child(parent_node_id, node_data, edge_data)?;
            stack.extend(children[index].iter().rev().map(|&c| (c, node_id)));
        }

        for step in &self.finish_steps {
            trace!(step = %step.name, "finish step");
            (step.run)(tree).map_err(TreeParseError::Finish)?;
        }

        Ok(())
    }

    fn node_data(
        &self,
        element: &NewickBrokerElement,
    ) -> Result<NodeData, TreeParseError> {
        let mut data = (self.node_data_factory)();
        for step in &self.node_steps {
            trace!(step = %step.name, node = %element.name, "node step");
            (step.run)(element, &mut data).map_err(|error| {
                TreeParseError::Payload { at: element.position, error }
            })?;
        }
        Ok(data)
    }

    fn edge_data(
        &self,
        element: &NewickBrokerElement,
    ) -> Result<EdgeData, TreeParseError> {
        let mut data = (self.edge_data_factory)();
        for step in &self.edge_steps {
            trace!(step = %step.name, node = %element.name, "edge step");
            (step.run)(element, &mut data).map_err(|error| {
                TreeParseError::Payload { at: element.position, error }
            })?;
        }
        Ok(data)
    }
}

// =============================================================================
// Grammar
// =============================================================================

/// Element under construction, with what has been seen of its label.
#[derive(Debug, Default)]
struct PendingElement {
    element: NewickBrokerElement,
    has_name: bool,
    expects_branch_length: bool,
    position: Option<Position>,
}

impl PendingElement {
    fn new(depth: usize) -> Self {
        Self { element: NewickBrokerElement::new(depth), ..Default::default() }
    }

    fn touch(&mut self, at: Position) {
        _ = self.position.get_or_insert(at);
    }

    fn finish(self, at: Position) -> NewickBrokerElement {
        let mut element = self.element;
        element.position = self.position.unwrap_or(at);
        element
    }
}

/// An opening parenthesis that is not closed yet, with the annotations
/// written in front of it. Those belong to the inner node it opens.
#[derive(Debug)]
struct OpenClade {
    at: Position,
    tags: Vec<String>,
    comments: Vec<String>,
}

fn unexpected(kind: &TokenKind, at: Position) -> ParseError {
    ParseError::UnexpectedToken { token: kind.to_string(), at }
}

/// Reads the next tree from `lexer` into a broker.
///
/// Returns `Ok(None)` if the input holds no further tree; annotations
/// after the last tree are ignored.
pub(crate) fn parse_broker(
    lexer: &mut NewickLexer<'_>,
    options: &NewickReaderOptions,
) -> Result<Option<NewickBroker>, ParseError> {
    let mut broker = NewickBroker::new();
    let mut open: Vec<OpenClade> = Vec::new();
    let mut pending = PendingElement::new(0);
    let mut can_open = true;
    let mut started = false;

    while let Some(token) = lexer.next() {
        let Token { kind, at } = token?;

        // Annotations may sit between ':' and the length (`A:[&r=1]0.1`).
        match kind {
            TokenKind::Comment(comment) => {
                pending.element.comments.push(comment);
                continue;
            }
            TokenKind::Tag(tag) => {
                pending.touch(at);
                pending.element.tags.push(tag);
                continue;
            }
            _ => started = true,
        }

        if pending.expects_branch_length && !matches!(kind, TokenKind::Symbol(_))
        {
            return Err(ParseError::InvalidBranchLength {
                value: String::new(),
                at,
            });
        }

        match kind {
            TokenKind::OpenParen => {
                if !can_open {
                    return Err(unexpected(&kind, at));
                }
                open.push(OpenClade {
                    at,
                    tags: std::mem::take(&mut pending.element.tags),
                    comments: std::mem::take(&mut pending.element.comments),
                });
                pending = PendingElement::new(open.len());
            }
            TokenKind::Comma => {
                if open.is_empty() {
                    return Err(unexpected(&kind, at));
                }
                broker.push(pending.finish(at));
                pending = PendingElement::new(open.len());
                can_open = true;
            }
            TokenKind::CloseParen => {
                let Some(clade) = open.pop() else {
                    return Err(ParseError::UnbalancedParentheses { at });
                };
                broker.push(pending.finish(at));
                pending = PendingElement::new(open.len());
                pending.element.tags = clade.tags;
                pending.element.comments = clade.comments;
                pending.touch(at);
                can_open = false;
            }
            TokenKind::Colon => {
                if pending.element.branch_length.is_some() {
                    return Err(unexpected(&kind, at));
                }
                pending.touch(at);
                pending.expects_branch_length = true;
                can_open = false;
            }
            TokenKind::Symbol(symbol) => {
                pending.touch(at);
                if pending.expects_branch_length {
                    let value = symbol.parse::<TreeFloat>().map_err(|_| {
                        ParseError::InvalidBranchLength { value: symbol.clone(), at }
                    })?;
                    pending.element.branch_length = Some(value);
                    pending.expects_branch_length = false;
                } else if pending.has_name
                    || pending.element.branch_length.is_some()
                {
                    return Err(ParseError::UnexpectedToken {
                        token: TokenKind::Symbol(symbol).to_string(),
                        at,
                    });
                } else {
                    pending.element.name = if options.replace_name_underscores {
                        symbol.replace('_', " ")
                    } else {
                        symbol
                    };
                    pending.has_name = true;
                }
                can_open = false;
            }
            TokenKind::Quoted(name) => {
                if pending.has_name || pending.element.branch_length.is_some() {
                    return Err(ParseError::UnexpectedToken {
                        token: TokenKind::Quoted(name).to_string(),
                        at,
                    });
                }
                pending.touch(at);
                pending.element.name = name;
                pending.has_name = true;
                can_open = false;
            }
            TokenKind::Semicolon => {
                if let Some(clade) = open.last() {
                    return Err(ParseError::UnbalancedParentheses { at: clade.at });
                }
                broker.push(pending.finish(at));
                return Ok(Some(broker));
            }
            TokenKind::Comment(_) | TokenKind::Tag(_) => {}
        }
    }

    if !started {
        return Ok(None);
    }
    if let Some(clade) = open.last() {
        return Err(ParseError::UnbalancedParentheses { at: clade.at });
    }
    Err(ParseError::MissingSemicolon { at: lexer.at() })
}
