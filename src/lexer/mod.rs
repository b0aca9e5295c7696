//! # Lexer
//!
//! Turns raw text into a flat [`Token`] stream. The lexer is a [`Processor`]
//! over `char`s whose registry holds the declared token rules plus two
//! synthesized ones:
//!
//! ```text
//! <root>  := <token>!                      until the input is exhausted
//! <token> := kind_1 | kind_2 | ... | kind_n
//! ```
//!
//! Every outermost node labeled with a declared kind becomes one token whose
//! value is the concatenation of the characters it consumed and whose `pos` is
//! the char offset where it starts. Hidden tokens still advance the offset.

use std::fmt;

use tracing::debug;

use crate::processor::{Error, Item, Node, Processor, Rule};

const ROOT_RULE: &str = "<root>";
const TOKEN_RULE: &str = "<token>";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: String,
    pub value: String,
    /// Char offset of the token's first character in the lexed input.
    pub pos: usize,
}

impl Token {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            pos: 0,
        }
    }

    pub fn at(mut self, pos: usize) -> Self {
        self.pos = pos;
        self
    }

    /// Returns a human-readable description of the token
    pub fn describe(&self) -> String {
        format!("{} '{}'", self.kind, self.value.escape_debug())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.value.escape_debug())
    }
}

/// Tokens are matched by kind.
impl Item for Token {
    type Key = String;

    fn key(&self) -> &String {
        &self.kind
    }
}

/// How the lexer picks among token rules matching at the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dispatch {
    /// The first declared rule that matches wins.
    #[default]
    FirstMatch,
    /// Exactly one rule may match; several matching is an ambiguity error.
    Unambiguous,
}

#[derive(Debug, Clone, Copy)]
pub struct LexerOptions {
    pub dispatch: Dispatch,
    /// Token kinds matched but left out of the output stream.
    pub hidden: fn(&str) -> bool,
}

impl LexerOptions {
    pub fn dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn hidden(mut self, hidden: fn(&str) -> bool) -> Self {
        self.hidden = hidden;
        self
    }
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            dispatch: Dispatch::default(),
            hidden: |kind| kind.starts_with('_'),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lexer {
    processor: Processor<char>,
    kinds: Vec<String>,
    options: LexerOptions,
}

impl Lexer {
    pub fn new<N>(rules: impl IntoIterator<Item = (N, Rule<char>)>) -> Result<Self, Error>
    where
        N: Into<String>,
    {
        Self::with_options(rules, LexerOptions::default())
    }

    pub fn with_options<N>(
        rules: impl IntoIterator<Item = (N, Rule<char>)>,
        options: LexerOptions,
    ) -> Result<Self, Error>
    where
        N: Into<String>,
    {
        let rules: Vec<(String, Rule<char>)> = rules
            .into_iter()
            .map(|(name, rule)| (name.into(), rule))
            .collect();
        let kinds: Vec<String> = rules.iter().map(|(name, _)| name.clone()).collect();

        let alternatives = kinds.iter().map(|kind| Rule::reference(kind.as_str()));
        let token: Rule<char> = match options.dispatch {
            Dispatch::FirstMatch => Rule::or(alternatives),
            Dispatch::Unambiguous => Rule::xor(alternatives),
        };
        let root: Rule<char> = Rule::until_empty(Rule::reference(TOKEN_RULE));

        let processor = Processor::new(
            ROOT_RULE,
            [(ROOT_RULE.to_string(), root), (TOKEN_RULE.to_string(), token)]
                .into_iter()
                .chain(rules),
        )?;

        Ok(Self {
            processor,
            kinds,
            options,
        })
    }

    /// Declared token kinds, in dispatch order.
    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }

    pub fn rule(&self, kind: &str) -> Option<&Rule<char>> {
        if self.kinds.iter().any(|k| k == kind) {
            self.processor.rule(kind)
        } else {
            None
        }
    }

    pub fn options(&self) -> LexerOptions {
        self.options
    }

    pub fn processor(&self) -> &Processor<char> {
        &self.processor
    }

    /// Tokenizes `input`, failing at the first position no token rule matches.
    pub fn apply(&self, input: &str) -> Result<Vec<Token>, Error> {
        let chars: Vec<char> = input.chars().collect();
        let (root, _) = self.processor.apply_root(&chars)?;

        let mut offset = 0;
        let mut tokens = Vec::new();
        for node in root.select(|node| self.is_kind(node)) {
            let pos = offset;
            let value: String = node.values().into_iter().collect();
            offset += value.chars().count();

            let Some(kind) = node.rule_name.as_deref() else {
                continue;
            };
            if !(self.options.hidden)(kind) {
                tokens.push(Token::new(kind, value).at(pos));
            }
        }

        debug!(chars = chars.len(), tokens = tokens.len(), "lexed input");
        Ok(tokens)
    }

    fn is_kind(&self, node: &Node<char>) -> bool {
        node.rule_name
            .as_deref()
            .is_some_and(|name| self.kinds.iter().any(|kind| kind == name))
    }
}

/// Builds a rule matching `text` character by character.
pub fn text(text: &str) -> Rule<char> {
    let mut chars: Vec<Rule<char>> = text.chars().map(Rule::Literal).collect();
    if chars.len() == 1 {
        return chars.remove(0);
    }
    Rule::And(chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_rules_wrap_declared_kinds() {
        let lexer = Lexer::new([("a", Rule::literal('a')), ("b", Rule::literal('b'))]).unwrap();
        assert_eq!(lexer.processor().root_rule_name(), ROOT_RULE);
        assert_eq!(
            lexer.processor().rule(TOKEN_RULE),
            Some(&Rule::Or(vec![Rule::Ref("a".into()), Rule::Ref("b".into())]))
        );
        assert_eq!(lexer.rule("a"), Some(&Rule::Literal('a')));
        assert_eq!(lexer.rule(TOKEN_RULE), None);
    }

    #[test]
    fn text_builds_sequences() {
        assert_eq!(text("x"), Rule::Literal('x'));
        assert_eq!(
            text("->"),
            Rule::And(vec![Rule::Literal('-'), Rule::Literal('>')])
        );
    }

    #[test]
    fn token_display_escapes_value() {
        assert_eq!(Token::new("ws", "\n").to_string(), "ws(\\n)");
        assert_eq!(Token::new("id", "x").describe(), "id 'x'");
    }
}
