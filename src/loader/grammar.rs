//! Compiler for the grammar language.
//!
//! A grammar is a list of declarations. Lexer declarations bind a token kind
//! to a quoted lexer-rule expression, parser declarations bind a rule name to
//! an expression over token kinds, rule names and quoted literals:
//!
//! ```text
//! _ws = "\w+";
//! id = "[a-z]+";
//! list -> "\(" item* "\)";
//! item -> id | list;
//! ```
//!
//! The first parser declaration is the root. A quoted literal inside a parser
//! rule declares an anonymous token whose kind is the quoted text itself; those
//! tokens are dispatched ahead of the declared ones, so keywords win over
//! identifiers.

use std::collections::HashSet;

use tracing::debug;

use super::lexer_rule;
use crate::lexer::{Dispatch, Lexer, LexerOptions, Token, text};
use crate::parser::Parser;
use crate::processor::{Error, ErrorKind, Node, Rule};

const OPERATORS: [&str; 9] = ["=", ";", "|", "(", ")", "*", "+", "?", "!"];

const TERMS: &[&str] = &[
    "zero_or_more",
    "one_or_more",
    "zero_or_one",
    "until_empty",
    "atom",
];

/// Builds a [`Parser`] and its [`Lexer`] from grammar source.
pub fn load_parser(src: &str) -> Result<Parser, Error> {
    let root = meta_parser()?
        .apply(src)
        .map_err(|err| Error::new(ErrorKind::Malformed("grammar".into())).with_children(vec![err]))?;
    let decls = root.select_named(&["lexer_decl", "parser_decl"]);

    let mut names = HashSet::new();
    let mut lexer_rules = Vec::new();
    for decl in decls.iter().filter(|decl| decl.is_named("lexer_decl")) {
        let name = declared_name(decl, &mut names)?;
        let body = decl
            .values()
            .into_iter()
            .find(|token| token.kind == "str")
            .ok_or_else(|| malformed("lexer declaration"))?;
        lexer_rules.push((name, lexer_rule(unquote(&body.value))?));
    }

    let mut compiler = Compiler {
        lexer_names: lexer_rules.iter().map(|(name, _)| name.clone()).collect(),
        literals: Vec::new(),
    };
    let mut parser_rules = Vec::new();
    for decl in decls.iter().filter(|decl| decl.is_named("parser_decl")) {
        let name = declared_name(decl, &mut names)?;
        let rule = compiler.alternation(decl.select_one_named(&["alternation"])?)?;
        parser_rules.push((name, rule));
    }

    let root_rule_name = parser_rules
        .first()
        .map(|(name, _)| name.clone())
        .ok_or_else(|| malformed("grammar without parser rules"))?;

    debug!(
        root = %root_rule_name,
        lexer_rules = lexer_rules.len(),
        literals = compiler.literals.len(),
        parser_rules = parser_rules.len(),
        "loaded grammar"
    );

    let lexer = Lexer::new(compiler.literals.into_iter().chain(lexer_rules))?;
    Parser::new(root_rule_name, parser_rules, lexer)
}

fn meta_lexer() -> Result<Lexer, Error> {
    let mut rules = vec![
        ("_ws".to_string(), lexer_rule(r"\w+")?),
        (
            "id".to_string(),
            lexer_rule("(_|[a-z]|[A-Z])(_|[a-z]|[A-Z]|[0-9])*")?,
        ),
        ("str".to_string(), lexer_rule(r#""((\\\\)|(\\")|^")*""#)?),
        ("->".to_string(), text("->")),
    ];
    for op in OPERATORS {
        rules.push((op.to_string(), lexer_rule(&format!("\\{op}"))?));
    }
    Lexer::with_options(rules, LexerOptions::default().dispatch(Dispatch::Unambiguous))
}

fn meta_parser() -> Result<Parser, Error> {
    let lit = |kind: &str| Rule::<Token>::literal(kind);
    let r = |name: &str| Rule::<Token>::reference(name);
    let postfix = |op: &str| r("atom") + lit(op);

    Parser::new(
        "root",
        [
            ("root", Rule::until_empty(r("decl"))),
            ("decl", r("lexer_decl") | r("parser_decl")),
            ("lexer_decl", lit("id") + lit("=") + lit("str") + lit(";")),
            (
                "parser_decl",
                lit("id") + lit("->") + r("alternation") + lit(";"),
            ),
            (
                "alternation",
                r("sequence") + Rule::zero_or_more(lit("|") + r("sequence")),
            ),
            ("sequence", Rule::one_or_more(r("term"))),
            (
                "term",
                r("zero_or_more") | r("one_or_more") | r("zero_or_one") | r("until_empty") | r("atom"),
            ),
            ("zero_or_more", postfix("*")),
            ("one_or_more", postfix("+")),
            ("zero_or_one", postfix("?")),
            ("until_empty", postfix("!")),
            ("atom", r("group") | r("ref") | r("literal")),
            ("group", lit("(") + r("alternation") + lit(")")),
            ("ref", lit("id")),
            ("literal", lit("str")),
        ],
        meta_lexer()?,
    )
}

/// Compiles parser rule bodies, collecting anonymous literal tokens on the way.
struct Compiler {
    lexer_names: HashSet<String>,
    literals: Vec<(String, Rule<char>)>,
}

impl Compiler {
    fn alternation(&mut self, node: &Node<Token>) -> Result<Rule<Token>, Error> {
        let mut rules = Vec::new();
        for sequence in node.skip().select_named(&["sequence"]) {
            rules.push(self.sequence(sequence)?);
        }
        Ok(unwrap_single(rules, Rule::Or))
    }

    fn sequence(&mut self, node: &Node<Token>) -> Result<Rule<Token>, Error> {
        let mut rules = Vec::new();
        for term in node.skip().select_named(&["term"]) {
            rules.push(self.term(term)?);
        }
        Ok(unwrap_single(rules, Rule::And))
    }

    fn term(&mut self, node: &Node<Token>) -> Result<Rule<Token>, Error> {
        let term = node.select_one_named(TERMS)?;
        if term.is_named("atom") {
            return self.atom(term);
        }

        let operand = self.atom(term.select_one_named(&["atom"])?)?;
        match term.rule_name.as_deref() {
            Some("zero_or_more") => Ok(Rule::zero_or_more(operand)),
            Some("one_or_more") => Ok(Rule::one_or_more(operand)),
            Some("zero_or_one") => Ok(Rule::zero_or_one(operand)),
            Some("until_empty") => Ok(Rule::until_empty(operand)),
            _ => Err(malformed("term")),
        }
    }

    fn atom(&mut self, node: &Node<Token>) -> Result<Rule<Token>, Error> {
        let atom = node.select_one_named(&["group", "ref", "literal"])?;
        match atom.rule_name.as_deref() {
            Some("group") => self.alternation(atom.select_one_named(&["alternation"])?),
            Some("ref") => {
                let name = &single_token(atom)?.value;
                if self.lexer_names.contains(name) {
                    Ok(Rule::literal(name.as_str()))
                } else {
                    Ok(Rule::reference(name.as_str()))
                }
            }
            Some("literal") => {
                let kind = &single_token(atom)?.value;
                if !self.literals.iter().any(|(existing, _)| existing == kind) {
                    self.literals.push((kind.clone(), lexer_rule(unquote(kind))?));
                }
                Ok(Rule::literal(kind.as_str()))
            }
            _ => Err(malformed("atom")),
        }
    }
}

/// Takes the declared name off `decl`, rejecting names already taken.
fn declared_name(decl: &Node<Token>, names: &mut HashSet<String>) -> Result<String, Error> {
    let name = decl
        .values()
        .first()
        .map(|token| token.value.clone())
        .ok_or_else(|| malformed("declaration"))?;
    if !names.insert(name.clone()) {
        return Err(Error::new(ErrorKind::DuplicateRule(name)));
    }
    Ok(name)
}

fn unwrap_single(
    mut rules: Vec<Rule<Token>>,
    wrap: fn(Vec<Rule<Token>>) -> Rule<Token>,
) -> Rule<Token> {
    if rules.len() == 1 {
        rules.remove(0)
    } else {
        wrap(rules)
    }
}

fn unquote(quoted: &str) -> &str {
    quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(quoted)
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
