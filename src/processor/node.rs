//! # Result Trees
//!
//! A successful application produces a [`Node`] tree built bottom-up. Leaves
//! carry the single item they matched, composite rules carry their children,
//! and every node produced at a named-rule boundary carries that rule's name.
//!
//! Downstream consumers extract structure with a small query algebra instead of
//! hand-written walks:
//!
//! - [`Node::select`] - outermost matches of a predicate, in document order
//! - [`Node::select_one`] - exactly one match, or an error
//! - [`Node::skip`] - the immediate children, so a query bypasses a self-match
//!
//! ```text
//! result.select(|n| n.is_named("rule"))              // every top-level `rule`
//! result.select_one(|n| n.is_named("class"))?        // the single `class`
//! ```

use std::fmt;

use super::{Error, ErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Node<I> {
    pub rule_name: Option<String>,
    pub value: Option<I>,
    pub children: Vec<Node<I>>,
}

impl<I> Node<I> {
    pub fn leaf(value: I) -> Self {
        Self {
            rule_name: None,
            value: Some(value),
            children: Vec::new(),
        }
    }

    pub fn branch(children: Vec<Node<I>>) -> Self {
        Self {
            rule_name: None,
            value: None,
            children,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.rule_name = Some(name.into());
        self
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.rule_name.as_deref() == Some(name)
    }

    pub fn is_named_any(&self, names: &[&str]) -> bool {
        self.rule_name
            .as_deref()
            .is_some_and(|name| names.contains(&name))
    }

    /// All leaf values under this node, in document order.
    pub fn values(&self) -> Vec<&I> {
        let mut values = Vec::new();
        self.collect_values(&mut values);
        values
    }

    fn collect_values<'n>(&'n self, out: &mut Vec<&'n I>) {
        if let Some(value) = &self.value {
            out.push(value);
        }
        for child in &self.children {
            child.collect_values(out);
        }
    }

    pub fn select<P>(&self, pred: P) -> Selection<'_, I>
    where
        P: Fn(&Node<I>) -> bool,
    {
        Selection::of(vec![self]).select(pred)
    }

    pub fn select_one<P>(&self, pred: P) -> Result<&Node<I>, Error>
    where
        P: Fn(&Node<I>) -> bool,
    {
        Selection::of(vec![self]).select_one(pred)
    }

    pub fn select_named(&self, names: &[&str]) -> Selection<'_, I> {
        Selection::of(vec![self]).select_named(names)
    }

    pub fn select_one_named(&self, names: &[&str]) -> Result<&Node<I>, Error> {
        Selection::of(vec![self]).select_one_named(names)
    }

    pub fn skip(&self) -> Selection<'_, I> {
        Selection::of(self.children.iter().collect())
    }
}

impl<I: fmt::Display> Node<I> {
    fn render(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{}", "  ".repeat(indent))?;
        match &self.rule_name {
            Some(name) => write!(f, "{name}")?,
            None => write!(f, "_")?,
        }
        if let Some(value) = &self.value {
            write!(f, "({value})")?;
        }
        for child in &self.children {
            writeln!(f)?;
            child.render(f, indent + 1)?;
        }
        Ok(())
    }
}

impl<I: fmt::Display> fmt::Display for Node<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}

/// Borrowed nodes returned by a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'n, I> {
    nodes: Vec<&'n Node<I>>,
}

impl<'n, I> Selection<'n, I> {
    fn of(nodes: Vec<&'n Node<I>>) -> Self {
        Self { nodes }
    }

    /// Searches every selected node, stopping descent at the first match on
    /// each path.
    pub fn select<P>(&self, pred: P) -> Selection<'n, I>
    where
        P: Fn(&Node<I>) -> bool,
    {
        let mut found = Vec::new();
        for &node in &self.nodes {
            search(node, &pred, &mut found);
        }
        Selection::of(found)
    }

    pub fn select_one<P>(&self, pred: P) -> Result<&'n Node<I>, Error>
    where
        P: Fn(&Node<I>) -> bool,
    {
        exactly_one(self.select(pred), "match")
    }

    /// Outermost nodes named after any of `names`.
    pub fn select_named(&self, names: &[&str]) -> Selection<'n, I> {
        self.select(|node| node.is_named_any(names))
    }

    pub fn select_one_named(&self, names: &[&str]) -> Result<&'n Node<I>, Error> {
        exactly_one(self.select_named(names), &names.join("|"))
    }

    /// The children of every selected node.
    pub fn skip(&self) -> Selection<'n, I> {
        Selection::of(
            self.nodes
                .iter()
                .flat_map(|node| node.children.iter())
                .collect(),
        )
    }

    pub fn get(&self, index: usize) -> Option<&'n Node<I>> {
        self.nodes.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'n Node<I>> + '_ {
        self.nodes.iter().copied()
    }
}

impl<'n, I> IntoIterator for Selection<'n, I> {
    type Item = &'n Node<I>;
    type IntoIter = std::vec::IntoIter<&'n Node<I>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

fn exactly_one<'n, I>(found: Selection<'n, I>, query: &str) -> Result<&'n Node<I>, Error> {
    match found.nodes.as_slice() {
        [node] => Ok(*node),
        nodes => Err(Error::new(ErrorKind::QueryMismatch {
            query: query.to_string(),
            matched: nodes.len(),
        })),
    }
}

fn search<'n, I, P>(node: &'n Node<I>, pred: &P, found: &mut Vec<&'n Node<I>>)
where
    P: Fn(&Node<I>) -> bool,
{
    if pred(node) {
        found.push(node);
        return;
    }
    for child in &node.children {
        search(child, pred, found);
    }
}
