use grammarian::lexer::{Dispatch, Lexer, LexerOptions, Token, text};
use grammarian::loader::lexer_rule;
use grammarian::processor::Rule;
use rstest::rstest;

fn arithmetic() -> Lexer {
    Lexer::new([
        ("_ws", lexer_rule(r"\w+").unwrap()),
        ("int", lexer_rule("[0-9]+").unwrap()),
        ("id", lexer_rule("([a-z]|_)([a-z]|[0-9]|_)*").unwrap()),
        ("op", lexer_rule(r"(\+|\-|\*|/)").unwrap()),
        ("(", Rule::literal('(')),
        (")", Rule::literal(')')),
    ])
    .unwrap()
}

#[test]
fn lex_declared_kinds() {
    let lexer = Lexer::new([
        ("a", Rule::literal('a')),
        ("b", Rule::one_or_more(Rule::literal('c'))),
    ])
    .unwrap();

    assert_eq!(
        lexer.apply("acc").unwrap(),
        vec![Token::new("a", "a"), Token::new("b", "cc").at(1)]
    );
}

#[test]
fn lex_empty_input() {
    assert_eq!(arithmetic().apply("").unwrap(), Vec::<Token>::new());
}

#[test]
fn lex_expression() {
    let tokens = arithmetic().apply("(x1 + 42) * y").unwrap();
    let described: Vec<String> = tokens.iter().map(Token::describe).collect();
    assert_eq!(
        described,
        [
            "( '('", "id 'x1'", "op '+'", "int '42'", ") ')'", "op '*'", "id 'y'"
        ]
    );
}

#[rstest]
#[case("foo", "id")]
#[case("_tmp", "id")]
#[case("007", "int")]
#[case("/", "op")]
fn lex_single_token(#[case] input: &str, #[case] kind: &str) {
    assert_eq!(arithmetic().apply(input).unwrap(), vec![Token::new(kind, input)]);
}

#[test]
fn whitespace_is_hidden_by_default() {
    let tokens = arithmetic().apply("  a \n\t b  ").unwrap();
    assert_eq!(
        tokens,
        vec![Token::new("id", "a").at(2), Token::new("id", "b").at(7)]
    );
}

#[test]
fn hidden_kinds_are_configurable() {
    let lexer = Lexer::with_options(
        [("_x", Rule::literal('x')), ("sep", Rule::literal(';'))],
        LexerOptions::default().hidden(|kind| kind == "sep"),
    )
    .unwrap();

    assert_eq!(
        lexer.apply("x;x").unwrap(),
        vec![Token::new("_x", "x"), Token::new("_x", "x").at(2)]
    );
}

#[test]
fn unknown_character_fails_at_its_position() {
    let err = arithmetic().apply("a + $").unwrap_err();
    assert_eq!(err.rule_name.as_deref(), Some("<root>"));
    assert_eq!(err.furthest().pos, 4);
}

#[test]
fn first_match_prefers_earlier_kinds() {
    let keyword_first = Lexer::new([
        ("if", text("if")),
        ("id", lexer_rule("[a-z]+").unwrap()),
    ])
    .unwrap();
    assert_eq!(
        keyword_first.apply("if").unwrap(),
        vec![Token::new("if", "if")]
    );

    let id_first = Lexer::new([
        ("id", lexer_rule("[a-z]+").unwrap()),
        ("if", text("if")),
    ])
    .unwrap();
    assert_eq!(id_first.apply("if").unwrap(), vec![Token::new("id", "if")]);
}

#[test]
fn unambiguous_dispatch_rejects_overlapping_kinds() {
    let lexer = Lexer::with_options(
        [
            ("if", text("if")),
            ("id", lexer_rule("[a-z]+").unwrap()),
        ],
        LexerOptions::default().dispatch(Dispatch::Unambiguous),
    )
    .unwrap();

    assert_eq!(lexer.apply("x").unwrap(), vec![Token::new("id", "x")]);

    let err = lexer.apply("if").unwrap_err();
    assert!(err.to_string().contains("ambiguous match between"), "{err}");
}

#[test]
fn lexer_exposes_its_rules() {
    let lexer = arithmetic();
    assert_eq!(lexer.kinds(), ["_ws", "int", "id", "op", "(", ")"]);
    assert_eq!(lexer.rule("int"), Some(&Rule::one_or_more(Rule::class('0', '9'))));
    assert_eq!(lexer.rule("<token>"), None);
    assert_eq!(lexer.options().dispatch, Dispatch::FirstMatch);
}

#[test]
fn duplicate_kinds_are_rejected() {
    let err = Lexer::new([("a", Rule::literal('a')), ("a", Rule::literal('b'))]).unwrap_err();
    assert_eq!(err.msg(), "duplicate rule a");
}

#[test]
fn tokens_record_char_offsets() {
    let tokens = arithmetic().apply("foo  +\n(12)").unwrap();
    let offsets: Vec<(&str, usize)> = tokens
        .iter()
        .map(|token| (token.value.as_str(), token.pos))
        .collect();
    assert_eq!(
        offsets,
        [("foo", 0), ("+", 5), ("(", 7), ("12", 8), (")", 10)]
    );
}

#[test]
fn offsets_count_chars_not_bytes() {
    let lexer = Lexer::new([
        ("_ws", lexer_rule(r"\w+").unwrap()),
        ("word", lexer_rule(r"(^\w)+").unwrap()),
    ])
    .unwrap();

    let tokens = lexer.apply("héé ünï x").unwrap();
    let offsets: Vec<usize> = tokens.iter().map(|token| token.pos).collect();
    assert_eq!(offsets, [0, 4, 8]);
}
