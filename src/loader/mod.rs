//! # Loader
//!
//! Builds lexers and parsers from text. Two small languages are compiled here,
//! each by a parser that is itself built from this crate's rules:
//!
//! - [`lexer_rule`] compiles a regex-like expression into a `Rule<char>`
//! - [`load_parser`] compiles a grammar of lexer and parser declarations into a
//!   ready [`Parser`](crate::parser::Parser)
//!
//! The lexer-rule meta-grammar is written out by hand. The grammar language's
//! own token rules are then compiled through [`lexer_rule`].
//!
//! ## Lexer rules
//!
//! | syntax      | meaning                                   |
//! |-------------|-------------------------------------------|
//! | `a`         | the character `a`                         |
//! | `[a-z]`     | any character from `a` to `z`             |
//! | `(a b)`     | sequence                                  |
//! | `(a\|b)`    | first matching alternative                |
//! | `x*` `x+` `x?` | zero or more, one or more, optional    |
//! | `x!`        | repeat until the input is exhausted       |
//! | `^x`        | any single character except `x`           |
//! | `\n` `\t`   | newline, tab                              |
//! | `\w`        | space, newline or tab                     |
//! | `\c`        | `c` taken literally                       |

mod grammar;
mod lexer_rule;

pub use grammar::load_parser;
pub use lexer_rule::lexer_rule;
