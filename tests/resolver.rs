use lox_interpreter as lox;

use lox::error::LoxError;
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::Scanner;
use lox::token::Token;

/// Run the static pass only; evaluation never starts.
fn resolve(source: &str) -> Result<(), Vec<LoxError>> {
    let tokens: Vec<Token> = Scanner::new(source.as_bytes())
        .filter_map(Result::ok)
        .collect();

    let mut parser = Parser::new(tokens);
    let statements = parser.parse().expect("syntax error in test source");

    let mut output: Vec<u8> = Vec::new();
    let mut interpreter = Interpreter::new(&mut output);

    let mut resolver = Resolver::new(&mut interpreter);

    resolver.resolve(&statements)
}

fn expect_error(source: &str, message: &str) {
    let errors = resolve(source).expect_err("expected a resolution error");

    assert!(
        errors.iter().any(|e| e.to_string().contains(message)),
        "no error containing {:?} in {:?}",
        message,
        errors.iter().map(|e| e.to_string()).collect::<Vec<_>>()
    );
}

#[test]
fn reading_a_local_in_its_own_initializer() {
    expect_error(
        "{ var a = a; }",
        "Can't read local variable in its own initializer.",
    );
}

#[test]
fn global_initializer_may_mention_the_name() {
    // At global scope the name is looked up at runtime, not statically.
    assert!(resolve("var a = a;").is_ok());
}

#[test]
fn return_at_top_level() {
    expect_error("return 1;", "Can't return from top-level code.");
}

#[test]
fn return_with_value_in_initializer() {
    expect_error(
        "class C { init() { return 1; } }",
        "Can't return a value from an initializer.",
    );
}

#[test]
fn bare_return_in_initializer_is_legal() {
    assert!(resolve("class C { init() { return; } }").is_ok());
}

#[test]
fn this_outside_a_class() {
    expect_error("print this;", "Can't use 'this' outside of a class.");
}

#[test]
fn this_in_a_plain_function() {
    expect_error(
        "fun f() { print this; }",
        "Can't use 'this' outside of a class.",
    );
}

#[test]
fn super_outside_a_class() {
    expect_error(
        "fun f() { super.m(); }",
        "Can't use 'super' outside of a class.",
    );
}

#[test]
fn super_without_a_superclass() {
    expect_error(
        "class A { m() { super.m(); } }",
        "Can't use 'super' in a class with no superclass.",
    );
}

#[test]
fn class_inheriting_from_itself() {
    expect_error("class A < A {}", "A class can't inherit from itself.");
}

#[test]
fn redeclaring_in_the_same_scope_is_legal() {
    assert!(resolve("{ var a = 1; var a = 2; }").is_ok());
}

#[test]
fn multiple_errors_surface_in_one_pass() {
    let errors =
        resolve("{ var a = a; }\nreturn 1;").expect_err("expected resolution errors");

    assert_eq!(errors.len(), 2);
}

#[test]
fn function_may_recurse() {
    assert!(resolve("fun f(n) { if (n > 0) f(n - 1); }").is_ok());
}
