//! # Rule Application Errors
//!
//! Failures are trees mirroring the attempted-rule tree. Leaf errors describe a
//! single mismatch (`expected 'a' got 'b'`, `state empty`), composite rules wrap
//! the failures of their children, and every named-rule boundary crossed on the
//! way up attaches its name.
//!
//! The full trace is kept so diagnostics can report every attempted alternative,
//! or reconstruct the furthest point reached via [`Error::furthest`].

use std::fmt;

/// What went wrong at a single node of the error tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// A rule needed an item but the input was exhausted.
    #[error("state empty")]
    StateEmpty,

    /// The item at the current position did not satisfy a single-item rule.
    #[error("expected {expected} got {actual}")]
    Mismatch { expected: String, actual: String },

    /// The child of a negation matched where it must not.
    #[error("{0} unexpectedly matched")]
    UnexpectedMatch(String),

    /// A composite rule failed because of its (single) child.
    #[error("nested rule failed")]
    Nested,

    /// Every alternative of an alternation failed.
    #[error("no alternative matched")]
    NoAlternative,

    /// More than one alternative matched where exactly one is allowed.
    #[error("ambiguous match between {}", .matched.join(", "))]
    Ambiguous { matched: Vec<String> },

    /// A repetition succeeded without consuming input.
    #[error("repetition did not advance")]
    NoProgress,

    /// The root rule matched but left input behind.
    #[error("input not fully consumed: stopped at {consumed} of {total}")]
    Incomplete { consumed: usize, total: usize },

    #[error("unknown rule {0}")]
    UnknownRule(String),

    #[error("duplicate rule {0}")]
    DuplicateRule(String),

    /// A tree query expected exactly one match.
    #[error("expected exactly one {query} got {matched}")]
    QueryMismatch { query: String, matched: usize },

    /// Structurally invalid DSL input.
    #[error("malformed {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub rule_name: Option<String>,
    pub kind: ErrorKind,
    /// Input position at which the failing attempt started.
    pub pos: usize,
    pub children: Vec<Error>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            rule_name: None,
            kind,
            pos: 0,
            children: Vec::new(),
        }
    }

    /// A composite failure wrapping a single cause.
    pub fn nested(pos: usize, child: Error) -> Self {
        Self::new(ErrorKind::Nested).at(pos).with_children(vec![child])
    }

    pub fn at(mut self, pos: usize) -> Self {
        self.pos = pos;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.rule_name = Some(name.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Error>) -> Self {
        self.children = children;
        self
    }

    /// Leaf-level description of this node.
    pub fn msg(&self) -> String {
        self.kind.to_string()
    }

    /// The innermost named rule on the path to the furthest failure.
    pub fn innermost_rule_name(&self) -> Option<&str> {
        let mut best = self.rule_name.as_deref();
        let mut current = self;
        while let Some(next) = current.children.iter().max_by_key(|child| child.furthest().pos) {
            if let Some(name) = next.rule_name.as_deref() {
                best = Some(name);
            }
            current = next;
        }
        best
    }

    /// The error in this tree whose attempt started furthest into the input.
    ///
    /// Ties resolve to the shallowest, earliest error.
    pub fn furthest(&self) -> &Error {
        let mut best = self;
        for child in &self.children {
            let candidate = child.furthest();
            if candidate.pos > best.pos {
                best = candidate;
            }
        }
        best
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{}", "  ".repeat(indent))?;
        if let Some(name) = &self.rule_name {
            write!(f, "{name}: ")?;
        }
        write!(f, "{} at {}", self.kind, self.pos)?;
        for child in &self.children {
            writeln!(f)?;
            child.render(f, indent + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(pos: usize) -> Error {
        Error::new(ErrorKind::StateEmpty).at(pos)
    }

    #[test]
    fn furthest_prefers_deepest_position() {
        let err = Error::new(ErrorKind::NoAlternative).with_children(vec![
            Error::nested(0, leaf(2).named("b")),
            leaf(1).named("c"),
        ]);

        assert_eq!(err.furthest().pos, 2);
        assert_eq!(err.furthest().rule_name.as_deref(), Some("b"));
        assert_eq!(err.innermost_rule_name(), Some("b"));
    }

    #[test]
    fn display_renders_tree() {
        let err = Error::nested(0, leaf(1).named("a")).named("root");
        assert_eq!(
            err.to_string(),
            "root: nested rule failed at 0\n  a: state empty at 1"
        );
    }

    #[test]
    fn mismatch_message() {
        let kind = ErrorKind::Mismatch {
            expected: "'a'".into(),
            actual: "'b'".into(),
        };
        assert_eq!(kind.to_string(), "expected 'a' got 'b'");
    }
}
