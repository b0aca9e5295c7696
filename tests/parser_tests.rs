use grammarian::lexer::{Lexer, Token};
use grammarian::loader::lexer_rule;
use grammarian::parser::Parser;
use grammarian::processor::{ErrorKind, Node, Rule};

fn lit(kind: &str) -> Rule<Token> {
    Rule::literal(kind)
}

fn r(name: &str) -> Rule<Token> {
    Rule::reference(name)
}

fn sexpr_lexer() -> Lexer {
    Lexer::new([
        ("_ws", lexer_rule(r"\w+").unwrap()),
        ("(", Rule::literal('(')),
        (")", Rule::literal(')')),
        ("int", lexer_rule("[0-9]+").unwrap()),
        ("id", lexer_rule("[a-z]+").unwrap()),
    ])
    .unwrap()
}

/// ```text
/// exprs := expr!
/// expr  := list | int | id
/// list  := "(" expr* ")"
/// ```
fn sexpr_parser() -> Parser {
    Parser::new(
        "exprs",
        [
            ("exprs", Rule::until_empty(r("expr"))),
            ("expr", r("list") | lit("int") | lit("id")),
            ("list", lit("(") + Rule::zero_or_more(r("expr")) + lit(")")),
        ],
        sexpr_lexer(),
    )
    .unwrap()
}

fn values(node: &Node<Token>) -> Vec<&str> {
    node.values()
        .into_iter()
        .map(|token| token.value.as_str())
        .collect()
}

#[test]
fn parse_nested_lists() {
    let tree = sexpr_parser().apply("(add 1 (neg 2))").unwrap();

    assert_eq!(tree.rule_name.as_deref(), Some("exprs"));
    let top = tree.skip().select_named(&["expr"]);
    assert_eq!(top.len(), 1);

    let list = tree.select_one_named(&["list"]).unwrap();
    let items = list.skip().select_named(&["expr"]);
    let items: Vec<Vec<&str>> = items.iter().map(values).collect();
    assert_eq!(items, vec![vec!["add"], vec!["1"], vec!["(", "neg", "2", ")"]]);
}

#[test]
fn parse_several_top_level_expressions() {
    let tree = sexpr_parser().apply("1 x ()").unwrap();
    let exprs = tree.skip().select_named(&["expr"]);
    assert_eq!(exprs.len(), 3);
    assert_eq!(
        exprs.get(2).map(|expr| expr.select_named(&["list"]).len()),
        Some(1)
    );
}

#[test]
fn parse_empty_input() {
    let tree = sexpr_parser().apply("").unwrap();
    assert!(tree.children.is_empty());
}

#[test]
fn literals_match_tokens_by_kind() {
    let tree = sexpr_parser().apply("42").unwrap();
    let expr = tree.select_one_named(&["expr"]).unwrap();
    assert_eq!(expr.values(), vec![&Token::new("int", "42")]);
}

#[test]
fn unbalanced_input_fails() {
    let err = sexpr_parser().apply("(a (b)").unwrap_err();
    assert_eq!(err.rule_name.as_deref(), Some("exprs"));
    assert_eq!(err.furthest().kind, ErrorKind::StateEmpty);
    assert_eq!(err.furthest().pos, 5);
}

#[test]
fn lexer_errors_propagate() {
    let err = sexpr_parser().apply("(a $)").unwrap_err();
    assert_eq!(err.rule_name.as_deref(), Some("<root>"));
}

#[test]
fn leftover_tokens_are_reported() {
    let parser = Parser::new("one", [("one", lit("int"))], sexpr_lexer()).unwrap();

    let err = parser.apply("1 2 3").unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::Incomplete {
            consumed: 1,
            total: 3
        }
    );
    assert_eq!(err.pos, 1);
    assert_eq!(err.rule_name.as_deref(), Some("one"));

    assert!(parser.apply("7").is_ok());
}

#[test]
fn apply_tokens_skips_lexing() {
    let tokens = [Token::new("id", "f"), Token::new("int", "1")];
    let parser = Parser::new(
        "call",
        [("call", lit("id") + lit("int"))],
        sexpr_lexer(),
    )
    .unwrap();

    let tree = parser.apply_tokens(&tokens).unwrap();
    assert_eq!(values(&tree), ["f", "1"]);
    assert_eq!(tree.to_string(), "call\n  _(id(f))\n  _(int(1))");
}

#[test]
fn parser_exposes_its_parts() {
    let parser = sexpr_parser();
    assert_eq!(parser.processor().root_rule_name(), "exprs");
    assert_eq!(
        parser.processor().rule("expr").map(ToString::to_string),
        Some(r#"(list | "int" | "id")"#.to_string())
    );
    assert_eq!(parser.lexer().kinds().len(), 5);
}
