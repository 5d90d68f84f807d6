use lox_interpreter as lox;

use lox::ast::Stmt;
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::Scanner;
use lox::token::Token;

/// Feed lines to one persistent interpreter the way the REPL does: each
/// line runs the whole pipeline, top-level expression statements echo their
/// value, and an error drops the line while the session continues.
fn repl_session(lines: &[&str]) -> String {
    let mut output: Vec<u8> = Vec::new();
    let mut interpreter = Interpreter::new(&mut output);

    for line in lines {
        let tokens: Vec<Token> = Scanner::new(line.as_bytes())
            .filter_map(Result::ok)
            .collect();

        let mut parser = Parser::new(tokens);

        let statements = match parser.parse() {
            Ok(statements) => statements,
            Err(_) => continue,
        };

        let mut resolver = Resolver::new(&mut interpreter);

        if resolver.resolve(&statements).is_err() {
            continue;
        }

        for statement in &statements {
            let result = match statement {
                Stmt::Expression(expr) => interpreter.echo_expression(expr),

                _ => interpreter.interpret(std::slice::from_ref(statement)),
            };

            if result.is_err() {
                break;
            }
        }
    }

    String::from_utf8(output).expect("output is not UTF-8")
}

#[test]
fn expression_statements_echo_their_value() {
    assert_eq!(repl_session(&["1 + 2;"]), "3\n");
}

#[test]
fn echo_uses_the_value_rendering() {
    assert_eq!(
        repl_session(&["nil;", "true;", "2.5;", "4 / 2;", "\"hi\";", "clock;"]),
        "nil\ntrue\n2.5\n2\nhi\n<native fn>\n"
    );
}

#[test]
fn declarations_do_not_echo() {
    assert_eq!(repl_session(&["var a = 5;", "fun f() {}"]), "");
}

#[test]
fn echo_and_print_share_the_output_writer() {
    assert_eq!(repl_session(&["var a = 1;", "a;", "print a;"]), "1\n1\n");
}

#[test]
fn definitions_persist_across_lines() {
    let lines = [
        "fun max(x, y) { if (x > y) return x; return y; }",
        "max(10, 20);",
        "print max(5, 4);",
    ];

    assert_eq!(repl_session(&lines), "20\n5\n");
}

#[test]
fn closures_survive_their_defining_line() {
    let lines = [
        "fun makeCounter() { var i = 0; fun count() { i = i + 1; return i; } return count; }",
        "var counter = makeCounter();",
        "counter();",
        "counter();",
    ];

    assert_eq!(repl_session(&lines), "1\n2\n");
}

#[test]
fn runtime_error_leaves_the_session_usable() {
    assert_eq!(repl_session(&["var a = 1;", "nope;", "a;"]), "1\n");
}

#[test]
fn static_error_leaves_the_session_usable() {
    assert_eq!(repl_session(&["var a = 2;", "return 1;", "a;"]), "2\n");
}

#[test]
fn multiple_statements_on_one_line() {
    assert_eq!(repl_session(&["var a = 1; a + 1; print a;"]), "2\n1\n");
}
