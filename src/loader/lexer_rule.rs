//! Compiler for the lexer-rule expression language.
//!
//! ```text
//! root          := rule!
//! rule          := operation | operand
//! operation     := zero_or_more | one_or_more | zero_or_one | until_empty | not
//! zero_or_more  := operand "*"        one_or_more := operand "+"
//! zero_or_one   := operand "?"        until_empty := operand "!"
//! not           := "^" unary_operand
//! operand       := and | or | unary_operand
//! unary_operand := literal | class | special
//! class         := "[" literal "-" literal "]"
//! and           := "(" rule+ ")"
//! or            := "(" rule ("|" rule)+ ")"
//! ```
//!
//! The meta-grammar is built by hand, everything else is compiled through it.

use tracing::debug;

use crate::lexer::{Dispatch, Lexer, LexerOptions, Token};
use crate::parser::Parser;
use crate::processor::{Error, ErrorKind, Node, Rule};

const OPERATORS: &str = "()[-]+?*!^|";

type Loader = fn(&Node<Token>) -> Result<Rule<char>, Error>;

/// Loaders keyed by the meta-grammar rule they compile.
const LOADERS: &[(&str, Loader)] = &[
    ("literal", load_literal),
    ("special", load_special),
    ("class", load_class),
    ("and", load_and),
    ("or", load_or),
    ("zero_or_more", load_zero_or_more),
    ("one_or_more", load_one_or_more),
    ("zero_or_one", load_zero_or_one),
    ("until_empty", load_until_empty),
    ("not", load_not),
];

/// Compiles a lexer-rule expression such as `[a-z]+` or `(a|\n)`.
///
/// A top-level sequence of one rule compiles to that rule; longer sequences
/// compile to an `And`.
pub fn lexer_rule(src: &str) -> Result<Rule<char>, Error> {
    let root = meta_parser()?.apply(src).map_err(|err| {
        Error::new(ErrorKind::Malformed(format!("lexer rule {src:?}"))).with_children(vec![err])
    })?;

    let mut rules = load_rules(&root)?;
    let rule = if rules.len() == 1 {
        rules.remove(0)
    } else {
        Rule::And(rules)
    };

    debug!(src, %rule, "compiled lexer rule");
    Ok(rule)
}

fn meta_lexer() -> Result<Lexer, Error> {
    let operators = OPERATORS
        .chars()
        .map(|op| (op.to_string(), Rule::<char>::Literal(op)));
    let reserved: Rule<char> = Rule::or(OPERATORS.chars().chain(['\\']).map(Rule::Literal));

    Lexer::with_options(
        operators.chain([
            ("special".to_string(), Rule::<char>::literal('\\') + Rule::any()),
            ("literal".to_string(), Rule::not(reserved)),
        ]),
        LexerOptions::default().dispatch(Dispatch::Unambiguous),
    )
}

fn meta_parser() -> Result<Parser, Error> {
    let lit = |kind: &str| Rule::<Token>::literal(kind);
    let r = |name: &str| Rule::<Token>::reference(name);
    let postfix = |op: &str| r("operand") + lit(op);

    Parser::new(
        "root",
        [
            ("root", Rule::until_empty(r("rule"))),
            ("rule", r("operation") | r("operand")),
            (
                "operation",
                r("zero_or_more") | r("one_or_more") | r("zero_or_one") | r("until_empty") | r("not"),
            ),
            ("zero_or_more", postfix("*")),
            ("one_or_more", postfix("+")),
            ("zero_or_one", postfix("?")),
            ("until_empty", postfix("!")),
            ("not", lit("^") + r("unary_operand")),
            ("operand", r("and") | r("or") | r("unary_operand")),
            ("unary_operand", r("literal") | r("class") | r("special")),
            ("literal", lit("literal")),
            ("special", lit("special")),
            (
                "class",
                lit("[") + r("literal") + lit("-") + r("literal") + lit("]"),
            ),
            ("and", lit("(") + Rule::one_or_more(r("rule")) + lit(")")),
            (
                "or",
                lit("(") + r("rule") + Rule::one_or_more(lit("|") + r("rule")) + lit(")"),
            ),
        ],
        meta_lexer()?,
    )
}

fn load_rule(node: &Node<Token>) -> Result<Rule<char>, Error> {
    let names: Vec<&str> = LOADERS.iter().map(|(name, _)| *name).collect();
    let found = node.select_one_named(&names)?;
    let loader = LOADERS
        .iter()
        .find(|(name, _)| found.is_named(name))
        .map(|(_, loader)| loader)
        .ok_or_else(|| malformed("rule"))?;
    loader(found)
}

/// Every outermost `rule` below `node`.
fn load_rules(node: &Node<Token>) -> Result<Vec<Rule<char>>, Error> {
    node.skip()
        .select_named(&["rule"])
        .iter()
        .map(load_rule)
        .collect()
}

fn load_literal(node: &Node<Token>) -> Result<Rule<char>, Error> {
    let token = single_token(node)?;
    let c = token.value.chars().next().ok_or_else(|| malformed("literal"))?;
    Ok(Rule::Literal(c))
}

fn load_special(node: &Node<Token>) -> Result<Rule<char>, Error> {
    let token = single_token(node)?;
    let escaped = token.value.chars().nth(1).ok_or_else(|| malformed("escape"))?;
    Ok(match escaped {
        'n' => Rule::Literal('\n'),
        't' => Rule::Literal('\t'),
        'w' => Rule::or([' ', '\n', '\t'].map(Rule::Literal)),
        c => Rule::Literal(c),
    })
}

fn load_class(node: &Node<Token>) -> Result<Rule<char>, Error> {
    let bounds = node.select_named(&["literal"]);
    match (bounds.get(0), bounds.get(1), bounds.len()) {
        // `[a-z]` holds exactly two bounds
        (Some(min), Some(max), 2) => match (load_literal(min)?, load_literal(max)?) {
            (Rule::Literal(min), Rule::Literal(max)) => Ok(Rule::class(min, max)),
            _ => Err(malformed("class")),
        },
        _ => Err(malformed("class")),
    }
}

fn load_and(node: &Node<Token>) -> Result<Rule<char>, Error> {
    Ok(Rule::And(load_rules(node)?))
}

fn load_or(node: &Node<Token>) -> Result<Rule<char>, Error> {
    Ok(Rule::Or(load_rules(node)?))
}

fn load_operand(node: &Node<Token>) -> Result<Rule<char>, Error> {
    load_rule(node.select_one_named(&["operand", "unary_operand"])?)
}

fn load_zero_or_more(node: &Node<Token>) -> Result<Rule<char>, Error> {
    load_operand(node).map(Rule::zero_or_more)
}

fn load_one_or_more(node: &Node<Token>) -> Result<Rule<char>, Error> {
    load_operand(node).map(Rule::one_or_more)
}

fn load_zero_or_one(node: &Node<Token>) -> Result<Rule<char>, Error> {
    load_operand(node).map(Rule::zero_or_one)
}

fn load_until_empty(node: &Node<Token>) -> Result<Rule<char>, Error> {
    load_operand(node).map(Rule::until_empty)
}

fn load_not(node: &Node<Token>) -> Result<Rule<char>, Error> {
    load_operand(node).map(Rule::not)
}

fn single_token(node: &Node<Token>) -> Result<&Token, Error> {
    let mut values = node.values().into_iter();
    match (values.next(), values.next()) {
        (Some(token), None) => Ok(token),
        _ => Err(malformed("token")),
    }
}

fn malformed(what: &str) -> Error {
    Error::new(ErrorKind::Malformed(what.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_lexer_separates_operators_escapes_and_literals() {
        let tokens = meta_lexer().unwrap().apply(r"[a-\]]").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new("[", "["),
                Token::new("literal", "a").at(1),
                Token::new("-", "-").at(2),
                Token::new("special", "\\]").at(3),
                Token::new("]", "]").at(5),
            ]
        );
    }

    #[test]
    fn meta_parser_labels_operations() {
        let root = meta_parser().unwrap().apply("a*").unwrap();
        let op = root.select_one_named(&["zero_or_more"]).unwrap();
        assert_eq!(
            op.select_one_named(&["literal"]).unwrap().values(),
            vec![&Token::new("literal", "a")]
        );
    }
}
