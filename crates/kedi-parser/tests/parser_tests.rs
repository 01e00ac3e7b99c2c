//! Parser tests: declarations, statements, precedence, error recovery,
//! nesting limits, and determinism.

use kedi_lexer::Lexer;
use kedi_parser::{ParseResult, Parser, MAX_BLOCK_DEPTH, MAX_EXPR_DEPTH};
use kedi_types::ast::*;
use kedi_types::sexpr::ToSExpr;
use kedi_types::{ErrorCode, SourceFile, Span};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse(source: &str) -> ParseResult {
    let sf = SourceFile::new("test.kedi", source);
    let tokens = Lexer::new(&sf).lex().tokens;
    Parser::new(tokens, &sf).parse()
}

/// Parse and assert there are no errors.
fn parse_ok(source: &str) -> Program {
    let result = parse(source);
    assert!(
        !result.errors.has_errors(),
        "unexpected errors: {}",
        result.errors.to_message()
    );
    result.program
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    parse(source).errors.errors.iter().map(|e| e.code).collect()
}

/// Parse `fun f() { return <expr> }` and render the returned expression.
fn expr_sexpr(expr: &str) -> String {
    let program = parse_ok(&format!("fun f() {{ return {expr} }}"));
    match &program.functions[0].body.stmts[0] {
        Stmt::Return(ret) => ret.value.to_pretty_string(),
        other => panic!("expected return, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Declarations
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_program() {
    let program = parse_ok("");
    assert!(program.functions.is_empty());
    let program = parse_ok("\n\n// only a comment\n");
    assert!(program.functions.is_empty());
}

#[test]
fn test_function_declarations() {
    let program = parse_ok("fun add(a, b) {\n  return a + b\n}\n\nfun main() {\n  return add(1, 2)\n}\n");
    assert_eq!(program.functions.len(), 2);
    let add = &program.functions[0];
    assert_eq!(add.name.name, "add");
    let params: Vec<_> = add.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, ["a", "b"]);
    assert_eq!(add.span, Span::new(1, 1, 3, 1));
    assert!(program.functions[1].params.is_empty());
}

#[test]
fn test_one_line_function() {
    let program = parse_ok("fun one() { return 1 }");
    assert_eq!(
        program.to_pretty_string(),
        "(module (fun one () ((return 1))))"
    );
}

#[test]
fn test_keyword_as_function_name_is_rejected() {
    assert_eq!(error_codes("fun while() { return 1 }"), [ErrorCode::UNEXPECTED_TOKEN]);
}

#[test]
fn test_top_level_statement_is_rejected() {
    let result = parse("let x = 1\nfun main() { return 2 }");
    assert_eq!(result.errors.total_errors, 1);
    assert_eq!(result.errors.errors[0].code, ErrorCode::UNEXPECTED_TOKEN);
    assert!(result.errors.errors[0].message.contains("'fun'"));
    // Recovery resumes at the next declaration.
    assert_eq!(result.program.functions.len(), 1);
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_statement_forms() {
    let source = "\
fun f(n) {
  let x = 1
  x = x + n
  while x < 10 {
    x = x * 2
  }
  g(x)
  return x
}";
    let program = parse_ok(source);
    let stmts = &program.functions[0].body.stmts;
    assert!(matches!(stmts[0], Stmt::Let(_)));
    assert!(matches!(stmts[1], Stmt::Assign(_)));
    assert!(matches!(stmts[2], Stmt::While(_)));
    assert!(matches!(stmts[3], Stmt::Expr(_)));
    assert!(matches!(stmts[4], Stmt::Return(_)));
}

#[test]
fn test_if_else_if_chain() {
    let source = "\
fun sign(n) {
  if n < 0 {
    return -1
  } else if n == 0 {
    return 0
  } else {
    return 1
  }
}";
    let program = parse_ok(source);
    let Stmt::If(stmt) = &program.functions[0].body.stmts[0] else {
        panic!("expected if");
    };
    let Some(ElseBranch::ElseIf(nested)) = &stmt.else_branch else {
        panic!("expected else-if");
    };
    assert!(matches!(nested.else_branch, Some(ElseBranch::Block(_))));
    assert_eq!(stmt.span, Span::new(2, 3, 8, 3));
    assert_eq!(
        program.functions[0].body.to_pretty_string(),
        "((if (< n 0) ((return (neg 1))) ((if (== n 0) ((return 0)) ((return 1))))))"
    );
}

#[test]
fn test_return_requires_value() {
    assert_eq!(error_codes("fun f() {\n  return\n}"), [ErrorCode::UNEXPECTED_TOKEN]);
}

#[test]
fn test_two_statements_on_one_line() {
    assert_eq!(
        error_codes("fun f() {\n  let x = 1 let y = 2\n}"),
        [ErrorCode::UNEXPECTED_TOKEN]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Expressions & precedence
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(expr_sexpr("1 + 2 * 3"), "(+ 1 (* 2 3))");
    assert_eq!(expr_sexpr("(1 + 2) * 3"), "(* (+ 1 2) 3)");
    assert_eq!(expr_sexpr("10 - 4 - 3"), "(- (- 10 4) 3)");
    assert_eq!(expr_sexpr("7 % 4 / 2"), "(/ (% 7 4) 2)");
}

#[test]
fn test_logical_precedence() {
    assert_eq!(
        expr_sexpr("a or b and c"),
        "(or a (and b c))"
    );
    assert_eq!(
        expr_sexpr("a < 1 and b >= 2"),
        "(and (< a 1) (>= b 2))"
    );
}

#[test]
fn test_unary_operators() {
    assert_eq!(expr_sexpr("-x * 2"), "(* (neg x) 2)");
    assert_eq!(expr_sexpr("not not true"), "(not (not true))");
    assert_eq!(expr_sexpr("- -1"), "(neg (neg 1))");
}

#[test]
fn test_calls() {
    assert_eq!(expr_sexpr("f()"), "(call f ())");
    assert_eq!(expr_sexpr("f(1, g(2), x + 1)"), "(call f (1 (call g (2)) (+ x 1)))");
}

#[test]
fn test_comparison_does_not_chain() {
    assert_eq!(
        error_codes("fun f() { return 1 < 2 < 3 }"),
        [ErrorCode::UNEXPECTED_TOKEN]
    );
}

#[test]
fn test_missing_operand() {
    let result = parse("fun f() {\n  return 1 +\n}");
    assert_eq!(result.errors.errors[0].code, ErrorCode::UNEXPECTED_TOKEN);
    assert!(result.errors.errors[0].message.contains("expected expression"));
    assert_eq!(result.errors.errors[0].span.start_line, 2);
}

// ─────────────────────────────────────────────────────────────────────
// Error recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_recovers_at_next_statement() {
    let source = "\
fun f() {
  let = 1
  let y = )
  return 3
}";
    let result = parse(source);
    assert_eq!(result.errors.total_errors, 2);
    let body = &result.program.functions[0].body;
    assert!(matches!(body.stmts.last(), Some(Stmt::Return(_))));
}

#[test]
fn test_stray_fun_inside_block_terminates() {
    let result = parse("fun f() {\n  fun\n}");
    assert!(result.errors.has_errors());
}

#[test]
fn test_unclosed_block() {
    let result = parse("fun f() {\n  return 1\n");
    assert_eq!(result.errors.errors[0].code, ErrorCode::UNEXPECTED_TOKEN);
    assert!(result.errors.errors[0].message.contains("end of file"));
}

#[test]
fn test_error_message_carries_source_line() {
    let result = parse("fun f() {\n  return 1 +* 2\n}");
    let err = &result.errors.errors[0];
    assert_eq!(err.source_line, "  return 1 +* 2");
    assert_eq!(err.to_string(), "2:13: E100 [syntax] expected expression, got '*'");
}

// ─────────────────────────────────────────────────────────────────────
// Nesting limits
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_expression_nesting_limit() {
    let depth = MAX_EXPR_DEPTH as usize + 1;
    let expr = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let codes = error_codes(&format!("fun f() {{ return {expr} }}"));
    assert!(codes.contains(&ErrorCode::NESTING_LIMIT_EXCEEDED), "{codes:?}");

    let ok_depth = MAX_EXPR_DEPTH as usize - 2;
    let expr = format!("{}1{}", "(".repeat(ok_depth), ")".repeat(ok_depth));
    parse_ok(&format!("fun f() {{ return {expr} }}"));
}

#[test]
fn test_deep_unary_chain_is_limited() {
    let expr = "-".repeat(MAX_EXPR_DEPTH as usize + 5);
    let codes = error_codes(&format!("fun f() {{ return {expr}1 }}"));
    assert!(codes.contains(&ErrorCode::NESTING_LIMIT_EXCEEDED), "{codes:?}");
}

#[test]
fn test_long_operator_chain_is_limited() {
    for op in [" + ", " * ", " and ", " or "] {
        let expr = vec!["1"; 10_000].join(op);
        let codes = error_codes(&format!("fun f() {{ return {expr} }}"));
        assert_eq!(codes, [ErrorCode::NESTING_LIMIT_EXCEEDED], "chain of '{op}'");
    }
}

#[test]
fn test_operator_chain_within_limit() {
    let expr = vec!["1"; MAX_EXPR_DEPTH as usize - 2].join(" + ");
    parse_ok(&format!("fun f() {{ return {expr} }}"));
}

#[test]
fn test_else_if_chain_is_limited() {
    let mut source = String::from("fun f(n) {\n  if n == 0 { return 0 }");
    for i in 1..5_000 {
        source.push_str(&format!(" else if n == {i} {{ return {i} }}"));
    }
    source.push_str("\n  return 1\n}\n");
    let codes = error_codes(&source);
    assert!(codes.contains(&ErrorCode::NESTING_LIMIT_EXCEEDED), "{codes:?}");

    let mut source = String::from("fun f(n) {\n  if n == 0 { return 0 }");
    for i in 1..10 {
        source.push_str(&format!(" else if n == {i} {{ return {i} }}"));
    }
    source.push_str("\n  return 1\n}\n");
    parse_ok(&source);
}

#[test]
fn test_block_nesting_limit() {
    let depth = MAX_BLOCK_DEPTH as usize;
    let mut source = String::from("fun f() {\n");
    for _ in 0..depth {
        source.push_str("if true {\n");
    }
    for _ in 0..depth {
        source.push_str("}\n");
    }
    source.push('}');
    let codes = error_codes(&source);
    assert!(codes.contains(&ErrorCode::NESTING_LIMIT_EXCEEDED), "{codes:?}");
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_parser_determinism_100_iterations() {
    let source = "fun fib(n) {\n  if n < 2 { return n }\n  return fib(n - 1) + fib(n - 2)\n}\n";
    let first = parse_ok(source);
    for _ in 0..100 {
        assert_eq!(parse_ok(source), first);
    }
}
