use std::fmt;
use std::ops::{Add, BitOr};
use std::rc::Rc;

use super::{ApplyResult, Error, ErrorKind, Item, Node, State};

type PredicateFn<I> = Rc<dyn Fn(&I) -> bool>;

/// A labeled host predicate over a single item.
///
/// Two predicates are equal only if they share the same closure.
pub struct Predicate<I> {
    label: String,
    test: PredicateFn<I>,
}

impl<I> Predicate<I> {
    pub fn new<F: Fn(&I) -> bool + 'static>(label: impl Into<String>, test: F) -> Self {
        Predicate {
            label: label.into(),
            test: Rc::new(test),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn test(&self, item: &I) -> bool {
        (self.test)(item)
    }
}

impl<I> Clone for Predicate<I> {
    fn clone(&self) -> Self {
        Predicate {
            label: self.label.clone(),
            test: Rc::clone(&self.test),
        }
    }
}

impl<I> PartialEq for Predicate<I> {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && Rc::ptr_eq(&self.test, &other.test)
    }
}

impl<I> fmt::Debug for Predicate<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.label).finish()
    }
}

/// A grammar production.
///
/// Rules never hold direct pointers to other named rules; `Ref` resolves a name
/// against the processor carried by the state, which is what allows recursive
/// grammars without cyclic ownership.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule<I: Item> {
    /// One item whose key equals the given key.
    Literal(I::Key),
    /// One item whose key lies in `min..=max`.
    Class { min: I::Key, max: I::Key },
    Predicate(Predicate<I>),
    /// Every child, in order.
    And(Vec<Rule<I>>),
    /// The first child that matches.
    Or(Vec<Rule<I>>),
    /// Exactly one child must match; several matching is an ambiguity error.
    Xor(Vec<Rule<I>>),
    ZeroOrMore(Box<Rule<I>>),
    OneOrMore(Box<Rule<I>>),
    ZeroOrOne(Box<Rule<I>>),
    /// Repeats the child until the input is exhausted.
    UntilEmpty(Box<Rule<I>>),
    /// Consumes one item, provided the child does not match there.
    Not(Box<Rule<I>>),
    Ref(String),
}

impl<I: Item> Rule<I> {
    pub fn literal(key: impl Into<I::Key>) -> Self {
        Rule::Literal(key.into())
    }

    pub fn class(min: impl Into<I::Key>, max: impl Into<I::Key>) -> Self {
        Rule::Class {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn predicate<F: Fn(&I) -> bool + 'static>(label: impl Into<String>, test: F) -> Self {
        Rule::Predicate(Predicate::new(label, test))
    }

    /// Any single item.
    pub fn any() -> Self {
        Rule::predicate("any", |_| true)
    }

    pub fn and(rules: impl IntoIterator<Item = Rule<I>>) -> Self {
        Rule::And(rules.into_iter().collect())
    }

    pub fn or(rules: impl IntoIterator<Item = Rule<I>>) -> Self {
        Rule::Or(rules.into_iter().collect())
    }

    pub fn xor(rules: impl IntoIterator<Item = Rule<I>>) -> Self {
        Rule::Xor(rules.into_iter().collect())
    }

    pub fn zero_or_more(rule: Rule<I>) -> Self {
        Rule::ZeroOrMore(Box::new(rule))
    }

    pub fn one_or_more(rule: Rule<I>) -> Self {
        Rule::OneOrMore(Box::new(rule))
    }

    pub fn zero_or_one(rule: Rule<I>) -> Self {
        Rule::ZeroOrOne(Box::new(rule))
    }

    pub fn until_empty(rule: Rule<I>) -> Self {
        Rule::UntilEmpty(Box::new(rule))
    }

    pub fn not(rule: Rule<I>) -> Self {
        Rule::Not(Box::new(rule))
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Rule::Ref(name.into())
    }

    /// Applies this rule at `state`.
    ///
    /// On success returns the produced node and the state after the consumed
    /// input. The input state is left untouched either way, so a caller
    /// backtracks by reusing it.
    pub fn apply<'a>(&self, state: State<'a, I>) -> ApplyResult<'a, I> {
        match self {
            Rule::Literal(key) => self.apply_head(state, |item| item.key() == key),
            Rule::Class { min, max } => self.apply_head(state, |item| {
                let key = item.key();
                min <= key && key <= max
            }),
            Rule::Predicate(predicate) => self.apply_head(state, |item| predicate.test(item)),
            Rule::And(rules) => apply_and(rules, state),
            Rule::Or(rules) => apply_or(rules, state),
            Rule::Xor(rules) => apply_xor(rules, state),
            Rule::ZeroOrMore(rule) => {
                let (children, next) = repeat(rule, state, Vec::new());
                Ok((Node::branch(children), next))
            }
            Rule::OneOrMore(rule) => {
                let (first, after_first) = rule
                    .apply(state)
                    .map_err(|err| Error::nested(state.position(), err))?;
                let (children, next) = repeat(rule, after_first, vec![first]);
                Ok((Node::branch(children), next))
            }
            Rule::ZeroOrOne(rule) => match rule.apply(state) {
                Ok((child, next)) => Ok((Node::branch(vec![child]), next)),
                Err(_) => Ok((Node::branch(Vec::new()), state)),
            },
            Rule::UntilEmpty(rule) => apply_until_empty(rule, state),
            Rule::Not(rule) => {
                let head = state.head()?;
                match rule.apply(state) {
                    Ok(_) => Err(
                        Error::new(ErrorKind::UnexpectedMatch(rule.to_string()))
                            .at(state.position()),
                    ),
                    Err(_) => Ok((Node::leaf(head.clone()), state.tail()?)),
                }
            }
            Rule::Ref(name) => {
                let (child, next) = state
                    .processor()
                    .apply_named(name, state)
                    .map_err(|err| Error::nested(state.position(), err))?;
                Ok((Node::branch(vec![child]), next))
            }
        }
    }

    fn apply_head<'a, F>(&self, state: State<'a, I>, accept: F) -> ApplyResult<'a, I>
    where
        F: Fn(&I) -> bool,
    {
        let head = state.head()?;
        if !accept(head) {
            return Err(Error::new(ErrorKind::Mismatch {
                expected: self.to_string(),
                actual: format!("{:?}", head.key()),
            })
            .at(state.position()));
        }
        Ok((Node::leaf(head.clone()), state.tail()?))
    }
}

fn apply_and<'a, I: Item>(rules: &[Rule<I>], state: State<'a, I>) -> ApplyResult<'a, I> {
    let mut children = Vec::with_capacity(rules.len());
    let mut current = state;
    for rule in rules {
        let (child, next) = rule
            .apply(current)
            .map_err(|err| Error::nested(state.position(), err))?;
        children.push(child);
        current = next;
    }
    Ok((Node::branch(children), current))
}

fn apply_or<'a, I: Item>(rules: &[Rule<I>], state: State<'a, I>) -> ApplyResult<'a, I> {
    let mut errors = Vec::with_capacity(rules.len());
    for rule in rules {
        match rule.apply(state) {
            Ok((child, next)) => return Ok((Node::branch(vec![child]), next)),
            Err(err) => errors.push(err),
        }
    }
    Err(Error::new(ErrorKind::NoAlternative)
        .at(state.position())
        .with_children(errors))
}

fn apply_xor<'a, I: Item>(rules: &[Rule<I>], state: State<'a, I>) -> ApplyResult<'a, I> {
    let mut matched = Vec::new();
    let mut errors = Vec::new();
    for rule in rules {
        match rule.apply(state) {
            Ok(result) => matched.push((rule, result)),
            Err(err) => errors.push(err),
        }
    }
    if matched.len() > 1 {
        return Err(Error::new(ErrorKind::Ambiguous {
            matched: matched.iter().map(|(rule, _)| rule.to_string()).collect(),
        })
        .at(state.position()));
    }
    match matched.pop() {
        Some((_, (child, next))) => Ok((Node::branch(vec![child]), next)),
        None => Err(Error::new(ErrorKind::NoAlternative)
            .at(state.position())
            .with_children(errors)),
    }
}

/// Greedily applies `rule`, stopping at the first failure or at a repetition
/// that consumed nothing.
fn repeat<'a, I: Item>(
    rule: &Rule<I>,
    state: State<'a, I>,
    mut children: Vec<Node<I>>,
) -> (Vec<Node<I>>, State<'a, I>) {
    let mut current = state;
    while let Ok((child, next)) = rule.apply(current) {
        if next.position() == current.position() {
            break;
        }
        children.push(child);
        current = next;
    }
    (children, current)
}

fn apply_until_empty<'a, I: Item>(rule: &Rule<I>, state: State<'a, I>) -> ApplyResult<'a, I> {
    let mut children = Vec::new();
    let mut current = state;
    while !current.is_empty() {
        let (child, next) = rule
            .apply(current)
            .map_err(|err| Error::nested(state.position(), err))?;
        if next.position() == current.position() {
            return Err(Error::new(ErrorKind::NoProgress).at(current.position()));
        }
        children.push(child);
        current = next;
    }
    Ok((Node::branch(children), current))
}

// === Operator Overloading ===

/// `+` for sequence: `a + b` -> `And([a, b])`, extending a left-hand `And`.
impl<I: Item> Add for Rule<I> {
    type Output = Rule<I>;

    fn add(self, rhs: Rule<I>) -> Self::Output {
        match self {
            Rule::And(mut rules) => {
                rules.push(rhs);
                Rule::And(rules)
            }
            lhs => Rule::And(vec![lhs, rhs]),
        }
    }
}

/// `|` for ordered choice: `a | b` -> `Or([a, b])`, extending a left-hand `Or`.
impl<I: Item> BitOr for Rule<I> {
    type Output = Rule<I>;

    fn bitor(self, rhs: Rule<I>) -> Self::Output {
        match self {
            Rule::Or(mut rules) => {
                rules.push(rhs);
                Rule::Or(rules)
            }
            lhs => Rule::Or(vec![lhs, rhs]),
        }
    }
}

fn write_joined<I: Item>(f: &mut fmt::Formatter<'_>, rules: &[Rule<I>], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, rule) in rules.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{rule}")?;
    }
    write!(f, ")")
}

impl<I: Item> fmt::Display for Rule<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Literal(key) => write!(f, "{key:?}"),
            Rule::Class { min, max } => write!(f, "[{min:?}-{max:?}]"),
            Rule::Predicate(predicate) => write!(f, "<{}>", predicate.label()),
            Rule::And(rules) => write_joined(f, rules, " "),
            Rule::Or(rules) => write_joined(f, rules, " | "),
            Rule::Xor(rules) => write_joined(f, rules, " || "),
            Rule::ZeroOrMore(rule) => write!(f, "{rule}*"),
            Rule::OneOrMore(rule) => write!(f, "{rule}+"),
            Rule::ZeroOrOne(rule) => write!(f, "{rule}?"),
            Rule::UntilEmpty(rule) => write!(f, "{rule}!"),
            Rule::Not(rule) => write!(f, "^{rule}"),
            Rule::Ref(name) => write!(f, "{name}"),
        }
    }
}
