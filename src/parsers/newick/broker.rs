use super::super::text::Position;
use crate::TreeFloat;
use crate::phylo::tree::TreeError;
use std::fmt::Display;
use std::ops::{Index, IndexMut};

/// One node of a NEWICK tree as it appears in the text.
///
/// `rank` is the number of children; it is only meaningful after
/// [NewickBroker::assign_ranks] has run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NewickBrokerElement {
    pub name: String,
    pub branch_length: Option<TreeFloat>,
    pub tags: Vec<String>,
    pub comments: Vec<String>,
    pub depth: usize,
    pub rank: usize,
    pub position: Position,
}

impl NewickBrokerElement {
    pub fn new(depth: usize) -> Self {
        Self { depth, ..Default::default() }
    }

    pub fn is_leaf(&self) -> bool { self.rank == 0 }

    pub fn is_root(&self) -> bool { self.depth == 0 }
}

/// Flat, post-ordered list of broker elements: every element comes after
/// all of its descendants and the root comes last.
///
/// This is the order in which closing parentheses emit elements, so the
/// reader fills it front to back and the writer renders it front to back.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NewickBroker {
    elements: Vec<NewickBrokerElement>,
}

impl NewickBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: NewickBrokerElement) {
        self.elements.push(element);
    }

    pub fn len(&self) -> usize { self.elements.len() }

    pub fn is_empty(&self) -> bool { self.elements.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, NewickBrokerElement> {
        self.elements.iter()
    }

    pub fn get(&self, index: usize) -> Option<&NewickBrokerElement> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut NewickBrokerElement> {
        self.elements.get_mut(index)
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// The root element, which is the last one.
    pub fn root(&self) -> Option<&NewickBrokerElement> {
        self.elements.last()
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Index of the parent of every element; `None` for the root and for
    /// elements whose depth does not fit below any parent.
    ///
    /// Walking the list backwards visits every parent before its children, so
    /// a stack holding the latest element per depth is enough to find them.
    pub fn parent_indices(&self) -> Vec<Option<usize>> {
        let mut parents = vec![None; self.elements.len()];
        let mut open: Vec<usize> = Vec::new();
        for (index, element) in self.elements.iter().enumerate().rev() {
            open.truncate(element.depth);
            if element.depth > 0 && open.len() == element.depth {
                parents[index] = open.last().copied();
            }
            open.push(index);
        }
        parents
    }

    /// Child indices of every element, in the order the children appear in
    /// the text.
    pub fn child_indices(&self) -> Vec<Vec<usize>> {
        let mut children = vec![Vec::new(); self.elements.len()];
        for (index, parent) in self.parent_indices().into_iter().enumerate() {
            if let Some(parent) = parent {
                children[parent].push(index);
            }
        }
        children
    }

    /// Sets the rank of every element to its number of children.
    pub fn assign_ranks(&mut self) {
        let children = self.child_indices();
        for (element, children) in self.elements.iter_mut().zip(children) {
            element.rank = children.len();
        }
    }

    /// Checks that the depths describe exactly one tree.
    ///
    /// There must be exactly one element of depth 0 and it must come last;
    /// going backwards from the root, the depth can grow by at most one per
    /// element.
    pub fn validate(&self) -> Result<(), TreeError> {
        let Some(root) = self.elements.last() else {
            return Err(TreeError::MissingRoot);
        };
        if root.depth != 0 {
            return Err(TreeError::InvalidTree(format!(
                "last broker element has depth {}, expected 0",
                root.depth
            )));
        }

        let mut previous_depth = 0;
        for (index, element) in self.elements.iter().enumerate().rev().skip(1)
        {
            if element.depth == 0 {
                return Err(TreeError::InvalidTree(format!(
                    "broker element {index} is a second root"
                )));
            }
            if element.depth > previous_depth + 1 {
                return Err(TreeError::InvalidTree(format!(
                    "broker element {index} has depth {} below depth {previous_depth}",
                    element.depth
                )));
            }
            previous_depth = element.depth;
        }
        Ok(())
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn node_count(&self) -> usize { self.len() }

    pub fn leaf_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_leaf()).count()
    }

    pub fn inner_count(&self) -> usize { self.len() - self.leaf_count() }

    pub fn max_rank(&self) -> usize {
        self.elements.iter().map(|e| e.rank).max().unwrap_or(0)
    }

    pub fn is_bifurcating(&self) -> bool {
        self.elements.iter().all(|e| e.rank == 0 || e.rank == 2)
    }
}

impl<'a> IntoIterator for &'a NewickBroker {
    type Item = &'a NewickBrokerElement;
    type IntoIter = std::slice::Iter<'a, NewickBrokerElement>;

    fn into_iter(self) -> Self::IntoIter { self.elements.iter() }
}

impl Index<usize> for NewickBroker {
    type Output = NewickBrokerElement;

    fn index(&self, index: usize) -> &Self::Output { &self.elements[index] }
}

impl IndexMut<usize> for NewickBroker {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.elements[index]
    }
}

impl Display for NewickBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for element in &self.elements {
            write!(
                f,
                "{}- depth: {} | rank: {} | {}",
                " ".repeat(element.depth * 4),
                element.depth,
                element.rank,
                match element.name.as_str() {
                    "" => "None",
                    name => name,
                }
            )?;
            if let Some(branch_length) = element.branch_length {
                write!(f, " | {branch_length}")?;
            }
            for tag in &element.tags {
                write!(f, " {{{tag}}}")?;
            }
            for comment in &element.comments {
                write!(f, " [{comment}]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ((A,B)C,D)E; in broker order.
    fn broker() -> NewickBroker {
        let mut broker = NewickBroker::new();
        for (name, depth) in [("A", 2), ("B", 2), ("C", 1), ("D", 1), ("E", 0)] {
            let mut element = NewickBrokerElement::new(depth);
            element.name = name.to_string();
            broker.push(element);
        }
        broker
    }

    #[test]
    fn test_parent_and_child_indices() {
        let broker = broker();
        assert_eq!(
            broker.parent_indices(),
            vec![Some(2), Some(2), Some(4), Some(4), None]
        );
        assert_eq!(
            broker.child_indices(),
            vec![vec![], vec![], vec![0, 1], vec![], vec![2, 3]]
        );
    }

    #[test]
    fn test_assign_ranks() {
        let mut broker = broker();
        broker.assign_ranks();
        let ranks: Vec<usize> = broker.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![0, 0, 2, 0, 2]);
        assert_eq!(broker.leaf_count(), 3);
        assert_eq!(broker.inner_count(), 2);
        assert_eq!(broker.max_rank(), 2);
        assert!(broker.is_bifurcating());
        assert!(broker.root().is_some_and(|e| e.is_root()));
    }

    #[test]
    fn test_validate() {
        assert!(broker().validate().is_ok());
        assert!(NewickBroker::new().validate().is_err());

        let mut two_roots = broker();
        two_roots.push(NewickBrokerElement::new(0));
        assert!(two_roots.validate().is_err());

        let mut jump = NewickBroker::new();
        jump.push(NewickBrokerElement::new(2));
        jump.push(NewickBrokerElement::new(0));
        assert!(jump.validate().is_err());
    }
}
