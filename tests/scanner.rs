use lox_interpreter as lox;

use lox::error::LoxError;
use lox::scanner::Scanner;
use lox::token::{Token, TokenType};

fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
    let scanner = Scanner::new(source.as_bytes());
    let tokens: Vec<Token> = scanner.filter_map(Result::ok).collect();

    assert_eq!(tokens.len(), expected.len());

    for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
        assert_eq!(actual.token_type, *expected_type);
        assert_eq!(actual.lexeme, *expected_lexeme);
    }
}

#[test]
fn symbols() {
    assert_token_sequence(
        "({*.,+*})",
        &[
            (TokenType::LEFT_PAREN, "("),
            (TokenType::LEFT_BRACE, "{"),
            (TokenType::STAR, "*"),
            (TokenType::DOT, "."),
            (TokenType::COMMA, ","),
            (TokenType::PLUS, "+"),
            (TokenType::STAR, "*"),
            (TokenType::RIGHT_BRACE, "}"),
            (TokenType::RIGHT_PAREN, ")"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn two_character_operators_match_greedily() {
    assert_token_sequence(
        "! != = == < <= > >=",
        &[
            (TokenType::BANG, "!"),
            (TokenType::BANG_EQUAL, "!="),
            (TokenType::EQUAL, "="),
            (TokenType::EQUAL_EQUAL, "=="),
            (TokenType::LESS, "<"),
            (TokenType::LESS_EQUAL, "<="),
            (TokenType::GREATER, ">"),
            (TokenType::GREATER_EQUAL, ">="),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn keywords_and_identifiers() {
    assert_token_sequence(
        "class classes var _under score99 fun",
        &[
            (TokenType::CLASS, "class"),
            (TokenType::IDENTIFIER, "classes"),
            (TokenType::VAR, "var"),
            (TokenType::IDENTIFIER, "_under"),
            (TokenType::IDENTIFIER, "score99"),
            (TokenType::FUN, "fun"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn number_literals() {
    let tokens: Vec<Token> = Scanner::new(b"12 3.5")
        .filter_map(Result::ok)
        .collect();

    match tokens[0].token_type {
        TokenType::NUMBER(n) => assert_eq!(n, 12.0),
        ref other => panic!("expected NUMBER, got {:?}", other),
    }

    match tokens[1].token_type {
        TokenType::NUMBER(n) => assert_eq!(n, 3.5),
        ref other => panic!("expected NUMBER, got {:?}", other),
    }
}

#[test]
fn trailing_dot_is_not_part_of_number() {
    assert_token_sequence(
        "123.",
        &[
            (TokenType::NUMBER(123.0), "123"),
            (TokenType::DOT, "."),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn string_literal_lexeme_keeps_quotes() {
    let tokens: Vec<Token> = Scanner::new(b"\"hello\"")
        .filter_map(Result::ok)
        .collect();

    assert_eq!(tokens[0].lexeme, "\"hello\"");

    match &tokens[0].token_type {
        TokenType::STRING(s) => assert_eq!(s, "hello"),
        other => panic!("expected STRING, got {:?}", other),
    }
}

#[test]
fn string_escapes() {
    // \" and \\ are the only processed escapes; anything else stays as-is.
    let tokens: Vec<Token> = Scanner::new(br#""a\"b\\c\nd""#)
        .filter_map(Result::ok)
        .collect();

    match &tokens[0].token_type {
        TokenType::STRING(s) => assert_eq!(s, "a\"b\\c\\nd"),
        other => panic!("expected STRING, got {:?}", other),
    }
}

#[test]
fn multiline_string_counts_lines() {
    let tokens: Vec<Token> = Scanner::new(b"\"a\nb\" x")
        .filter_map(Result::ok)
        .collect();

    assert_eq!(tokens[0].line, 2);
    assert_eq!(tokens[1].lexeme, "x");
    assert_eq!(tokens[1].line, 2);
}

#[test]
fn unterminated_string_is_an_error() {
    let results: Vec<Result<Token, LoxError>> = Scanner::new(b"\"abc").collect();

    let error = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("expected a lexical error");

    assert!(error.to_string().contains("Unterminated string."));
}

#[test]
fn comments_run_to_end_of_line() {
    let tokens: Vec<Token> = Scanner::new(b"// comment\n42")
        .filter_map(Result::ok)
        .collect();

    assert_eq!(tokens[0].lexeme, "42");
    assert_eq!(tokens[0].line, 2);
}

#[test]
fn scanning_continues_after_errors() {
    let results: Vec<Result<Token, LoxError>> = Scanner::new(b",.$(#").collect();

    // COMMA, DOT, error for '$', LEFT_PAREN, error for '#', EOF.
    assert_eq!(results.len(), 6);

    let error_count = results.iter().filter(|r| r.is_err()).count();
    assert_eq!(error_count, 2);

    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(
            err.to_string().contains("Unexpected character"),
            "unexpected message: {}",
            err
        );
    }

    let kinds: Vec<&TokenType> = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|t| &t.token_type)
        .collect();

    assert_eq!(
        kinds,
        [
            &TokenType::COMMA,
            &TokenType::DOT,
            &TokenType::LEFT_PAREN,
            &TokenType::EOF
        ]
    );
}

#[test]
fn newlines_increment_lines() {
    let tokens: Vec<Token> = Scanner::new(b"1\n2\r\n3")
        .filter_map(Result::ok)
        .collect();

    let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();

    assert_eq!(lines, [1, 2, 3, 3]);
}
