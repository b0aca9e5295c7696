//! # Grammarian - A Self-Hosted Lexer and Parser Toolkit
//!
//! Grammarian is a small backtracking rule engine. One generic core applies
//! grammar rules to any input sequence; the lexer and the parser are that core
//! specialized to characters and to tokens, and the loader compiles textual
//! grammars using a lexer and parser built from the same rules.
//!
//! ## Pipeline Flow
//!
//! ```text
//! Grammar Source (String)
//!     ↓
//! [Loader] → Lexer + Parser
//!
//! Input Text (String)
//!     ↓
//! [Lexer] → Token Stream (Vec<Token>)
//!     ↓
//! [Parser] → Parse Tree (Node<Token>)
//!     ↓
//! select / select_one / skip → the parts a consumer cares about
//! ```
//!
//! ## Module Structure
//!
//! - [`processor`] - Rules, the rule registry, result and error trees
//! - [`lexer`] - Characters to tokens
//! - [`parser`] - Tokens to parse trees
//! - [`loader`] - Lexer-rule expressions and grammar declarations from text
//!
//! ## Example
//!
//! ```text
//! _ws = "\w+";
//! int = "[0-9]+";
//! id = "[a-z]+";
//! exprs -> expr!;
//! expr -> int | id | "\(" expr* "\)";
//! ```
//!
//! Loading this grammar with [`loader::load_parser`] yields a parser that turns
//! `(add 1 (neg 2))` into a tree whose `expr` nodes can be walked with the
//! query methods on [`processor::Node`].

pub mod lexer;
pub mod loader;
pub mod parser;
pub mod processor;

pub use lexer::{Lexer, Token};
pub use loader::{lexer_rule, load_parser};
pub use parser::Parser;
pub use processor::{Error, ErrorKind, Node, Processor, Rule};
