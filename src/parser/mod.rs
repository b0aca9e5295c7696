//! # Parser
//!
//! A grammar [`Processor`] over [`Token`]s bound to the [`Lexer`] that produces
//! them. Literal rules match a token by kind, so `Rule::literal("int")` accepts
//! any `int` token and keeps the whole token as the leaf value.

use tracing::debug;

use crate::lexer::{Lexer, Token};
use crate::processor::{Error, ErrorKind, Node, Processor, Rule};

#[derive(Debug, Clone)]
pub struct Parser {
    processor: Processor<Token>,
    lexer: Lexer,
}

impl Parser {
    pub fn new<N>(
        root_rule_name: impl Into<String>,
        rules: impl IntoIterator<Item = (N, Rule<Token>)>,
        lexer: Lexer,
    ) -> Result<Self, Error>
    where
        N: Into<String>,
    {
        Ok(Self {
            processor: Processor::new(root_rule_name, rules)?,
            lexer,
        })
    }

    pub fn processor(&self) -> &Processor<Token> {
        &self.processor
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    /// Lexes and parses `input`.
    pub fn apply(&self, input: &str) -> Result<Node<Token>, Error> {
        let tokens = self.lexer.apply(input)?;
        self.apply_tokens(&tokens)
    }

    /// Parses an already lexed stream; every token must be consumed.
    pub fn apply_tokens(&self, tokens: &[Token]) -> Result<Node<Token>, Error> {
        let (node, state) = self.processor.apply_root(tokens)?;
        if !state.is_empty() {
            return Err(Error::new(ErrorKind::Incomplete {
                consumed: state.position(),
                total: tokens.len(),
            })
            .at(state.position())
            .named(self.processor.root_rule_name()));
        }
        debug!(
            root = self.processor.root_rule_name(),
            tokens = tokens.len(),
            "parsed input"
        );
        Ok(node)
    }
}
