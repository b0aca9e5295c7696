//! # Rule Processor
//!
//! The generic backtracking core shared by the lexer and the parser. A
//! [`Processor`] is a registry of named [`Rule`]s; applying one of them to an
//! input slice yields a [`Node`] tree or an [`Error`] tree.
//!
//! Every application threads an immutable [`State`] through the rules. Failed
//! alternatives simply drop the state they produced, so there is nothing to undo
//! when backtracking.
//!
//! Each named-rule boundary crossed during descent labels both the produced node
//! and any propagated error with the rule's name.

mod error;
mod node;
mod rule;
mod state;

use std::collections::HashMap;
use std::fmt;

use tracing::trace;

pub use error::{Error, ErrorKind};
pub use node::{Node, Selection};
pub use rule::{Predicate, Rule};
pub use state::State;

pub type ApplyResult<'a, I> = Result<(Node<I>, State<'a, I>), Error>;

/// An element of the input sequence a processor runs over.
pub trait Item: Clone + fmt::Debug + PartialEq {
    /// What literal and class rules compare against.
    type Key: Clone + fmt::Debug + PartialEq + PartialOrd;

    fn key(&self) -> &Self::Key;
}

impl Item for char {
    type Key = char;

    fn key(&self) -> &char {
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Processor<I: Item> {
    root_rule_name: String,
    rules: Vec<(String, Rule<I>)>,
    index: HashMap<String, usize>,
    root: usize,
}

impl<I: Item> Processor<I> {
    /// Builds a registry, keeping the declaration order of `rules`.
    ///
    /// Fails on duplicate names and when `root_rule_name` is not declared.
    pub fn new<N>(
        root_rule_name: impl Into<String>,
        rules: impl IntoIterator<Item = (N, Rule<I>)>,
    ) -> Result<Self, Error>
    where
        N: Into<String>,
    {
        let root_rule_name = root_rule_name.into();
        let mut entries = Vec::new();
        let mut index = HashMap::new();

        for (name, rule) in rules {
            let name = name.into();
            if index.insert(name.clone(), entries.len()).is_some() {
                return Err(Error::new(ErrorKind::DuplicateRule(name)));
            }
            entries.push((name, rule));
        }

        let root = *index
            .get(&root_rule_name)
            .ok_or_else(|| Error::new(ErrorKind::UnknownRule(root_rule_name.clone())))?;

        Ok(Self {
            root_rule_name,
            rules: entries,
            index,
            root,
        })
    }

    pub fn root_rule_name(&self) -> &str {
        &self.root_rule_name
    }

    pub fn root_rule(&self) -> &Rule<I> {
        &self.rules[self.root].1
    }

    pub fn rule(&self, name: &str) -> Option<&Rule<I>> {
        self.index.get(name).map(|&i| &self.rules[i].1)
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Rule<I>)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn apply_root<'a>(&'a self, items: &'a [I]) -> ApplyResult<'a, I> {
        self.apply_rule(&self.root_rule_name, items)
    }

    pub fn apply_rule<'a>(&'a self, name: &str, items: &'a [I]) -> ApplyResult<'a, I> {
        self.apply_named(name, State::new(items, self))
    }

    /// Applies the rule registered as `name` and labels the outcome with it.
    pub fn apply_named<'a>(&'a self, name: &str, state: State<'a, I>) -> ApplyResult<'a, I> {
        let rule = self.rule(name).ok_or_else(|| {
            Error::new(ErrorKind::UnknownRule(name.to_string())).at(state.position())
        })?;

        trace!(rule = name, pos = state.position(), "applying rule");

        rule.apply(state)
            .map(|(node, next)| (node.with_name(name), next))
            .map_err(|err| {
                trace!(rule = name, pos = state.position(), "rule failed");
                err.named(name)
            })
    }
}
