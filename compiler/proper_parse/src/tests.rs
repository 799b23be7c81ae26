use super::*;
use pretty_assertions::assert_eq;
use proper_ir::{Arg, BinaryOp, BoolOp, CmpOp, DictEntry, ImportedNames, StmtKind, UnaryOp};

fn parse_ok(source: &str) -> Program {
    match parse(source) {
        Ok(program) => program,
        Err(err) => panic!("unexpected parse error in {source:?}: {err}"),
    }
}

fn parse_err(source: &str) -> ParseError {
    match parse(source) {
        Ok(program) => panic!("expected error for {source:?}, got {program:?}"),
        Err(err) => err,
    }
}

fn expr(source: &str) -> (ExprArena, ExprId) {
    match parse_expr(source) {
        Ok(parsed) => parsed,
        Err(err) => panic!("unexpected parse error in {source:?}: {err}"),
    }
}

#[test]
fn test_empty_program() {
    assert!(parse_ok("").stmts.is_empty());
    assert!(parse_ok("\n# comment\n\n").stmts.is_empty());
}

#[test]
fn test_statements_split_on_newline_and_semicolon() {
    let program = parse_ok("a = 1; b = 2\nc = 3\n");
    assert_eq!(program.stmts.len(), 3);
}

#[test]
fn test_chained_assignment() {
    let program = parse_ok("a = b = 7");
    let StmtKind::Assign { targets, value } = &program.stmts[0].kind else {
        panic!("expected assignment");
    };
    assert_eq!(targets.len(), 2);
    assert_eq!(program.arena.kind(targets[0]), &ExprKind::Name("a".into()));
    assert_eq!(program.arena.kind(targets[1]), &ExprKind::Name("b".into()));
    assert_eq!(program.arena.kind(*value), &ExprKind::Int(7));
}

#[test]
fn test_tuple_assignment() {
    let program = parse_ok("a, b = 1, 2");
    let StmtKind::Assign { targets, value } = &program.stmts[0].kind else {
        panic!("expected assignment");
    };
    assert!(matches!(program.arena.kind(targets[0]), ExprKind::Tuple(items) if items.len() == 2));
    assert!(matches!(program.arena.kind(*value), ExprKind::Tuple(items) if items.len() == 2));
}

#[test]
fn test_assignment_to_call_is_error() {
    assert_eq!(parse_err("f() = 1").message, "cannot assign to expression");
}

#[test]
fn test_aug_and_annotated_assignment() {
    let program = parse_ok("x += 1\ny: int = 2\nz: str");
    assert!(matches!(
        program.stmts[0].kind,
        StmtKind::AugAssign {
            op: BinaryOp::Add,
            ..
        }
    ));
    assert!(matches!(
        program.stmts[1].kind,
        StmtKind::AnnAssign { value: Some(_), .. }
    ));
    assert!(matches!(
        program.stmts[2].kind,
        StmtKind::AnnAssign { value: None, .. }
    ));
}

#[test]
fn test_imports() {
    let program = parse_ok("import os.path as p, math\nfrom html import (div, span as s,)\nfrom m import *");
    let StmtKind::Import(names) = &program.stmts[0].kind else {
        panic!("expected import");
    };
    assert_eq!(names[0].path, "os.path");
    assert_eq!(names[0].alias.as_deref(), Some("p"));
    assert_eq!(names[1].path, "math");

    let StmtKind::FromImport { module, names } = &program.stmts[1].kind else {
        panic!("expected from-import");
    };
    assert_eq!(module, "html");
    let ImportedNames::Names(names) = names else {
        panic!("expected names");
    };
    assert_eq!(names.len(), 2);
    assert_eq!(names[1].alias.as_deref(), Some("s"));

    assert!(matches!(
        &program.stmts[2].kind,
        StmtKind::FromImport {
            names: ImportedNames::All,
            ..
        }
    ));
}

#[test]
fn test_relative_import_rejected() {
    assert_eq!(parse_err("from . import x").message, "relative imports are not supported");
}

#[test]
fn test_block_statements_rejected() {
    let err = parse_err("def f():\n    pass");
    assert_eq!(err.message, "`def` statements are not supported in configuration files");
    assert_eq!(err.span, Span::new(0, 3));
}

#[test]
fn test_unexpected_indent() {
    assert_eq!(parse_err("a = 1\n  b = 2").message, "unexpected indent");
}

#[test]
fn test_missing_separator() {
    let err = parse_err("a = 1 b = 2");
    assert_eq!(err.message, "expected end of statement, found identifier `b`");
}

#[test]
fn test_precedence() {
    let (arena, id) = expr("1 + 2 * 3");
    let ExprKind::Binary { op, right, .. } = arena.kind(id) else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(arena.kind(*right), ExprKind::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn test_power_is_right_associative_and_binds_over_unary() {
    let (arena, id) = expr("-2 ** 3 ** 2");
    let ExprKind::Unary { op, operand } = arena.kind(id) else {
        panic!("expected unary");
    };
    assert_eq!(*op, UnaryOp::Neg);
    let ExprKind::Binary { op, right, .. } = arena.kind(*operand) else {
        panic!("expected power");
    };
    assert_eq!(*op, BinaryOp::Pow);
    assert!(matches!(arena.kind(*right), ExprKind::Binary { op: BinaryOp::Pow, .. }));
}

#[test]
fn test_chained_comparison_with_two_token_operators() {
    let (arena, id) = expr("a < b not in c is not d");
    let ExprKind::Compare { rest, .. } = arena.kind(id) else {
        panic!("expected comparison");
    };
    let ops: Vec<CmpOp> = rest.iter().map(|(op, _)| *op).collect();
    assert_eq!(ops, vec![CmpOp::Lt, CmpOp::NotIn, CmpOp::IsNot]);
}

#[test]
fn test_boolean_operators() {
    let (arena, id) = expr("not a or b and c");
    let ExprKind::Logical { op, left, right } = arena.kind(id) else {
        panic!("expected or");
    };
    assert_eq!(*op, BoolOp::Or);
    assert!(matches!(arena.kind(*left), ExprKind::Unary { op: UnaryOp::Not, .. }));
    assert!(matches!(arena.kind(*right), ExprKind::Logical { op: BoolOp::And, .. }));
}

#[test]
fn test_conditional_expression() {
    let (arena, id) = expr("'a' if flag else 'b'");
    assert!(matches!(arena.kind(id), ExprKind::IfElse { .. }));
}

#[test]
fn test_call_arguments() {
    let (arena, id) = expr("div(1, *rest, cls='x', **extra)");
    let ExprKind::Call { func, args } = arena.kind(id) else {
        panic!("expected call");
    };
    assert_eq!(arena.kind(*func), &ExprKind::Name("div".into()));
    assert!(matches!(args[0], Arg::Positional(_)));
    assert!(matches!(args[1], Arg::Star(_)));
    assert!(matches!(&args[2], Arg::Keyword { name, .. } if name == "cls"));
    assert!(matches!(args[3], Arg::DoubleStar(_)));
}

#[test]
fn test_call_argument_errors() {
    assert_eq!(parse_err("f(a=1, a=2)").message, "keyword argument repeated: a");
    assert_eq!(
        parse_err("f(a=1, 2)").message,
        "positional argument follows keyword argument"
    );
}

#[test]
fn test_postfix_chain() {
    let (arena, id) = expr("config.items[0](x)");
    let ExprKind::Call { func, .. } = arena.kind(id) else {
        panic!("expected call");
    };
    let ExprKind::Subscript { receiver, .. } = arena.kind(*func) else {
        panic!("expected subscript");
    };
    assert!(matches!(arena.kind(*receiver), ExprKind::Attribute { name, .. } if name == "items"));
}

#[test]
fn test_displays() {
    let (arena, id) = expr("[1, (2,), (), {'a': 1, **b}]");
    let ExprKind::List(items) = arena.kind(id) else {
        panic!("expected list");
    };
    assert_eq!(items.len(), 4);
    assert!(matches!(arena.kind(items[1]), ExprKind::Tuple(t) if t.len() == 1));
    assert!(matches!(arena.kind(items[2]), ExprKind::Tuple(t) if t.is_empty()));
    let ExprKind::Dict(entries) = arena.kind(items[3]) else {
        panic!("expected dict");
    };
    assert!(matches!(entries[0], DictEntry::Pair { .. }));
    assert!(matches!(entries[1], DictEntry::Spread(_)));
}

#[test]
fn test_parenthesized_expression_is_not_tuple() {
    let (arena, id) = expr("(1)");
    assert_eq!(arena.kind(id), &ExprKind::Int(1));
}

#[test]
fn test_implicit_string_concatenation() {
    let (arena, id) = expr("'con' \"fig\"");
    assert_eq!(arena.kind(id), &ExprKind::Str("config".into()));
}

#[test]
fn test_unsupported_expressions() {
    assert_eq!(parse_err("x = {1, 2}").message, "set literals are not supported");
    assert_eq!(parse_err("x = [i for i in y]").message, "comprehensions are not supported");
    assert_eq!(parse_err("x = lambda: 1").message, "lambda expressions are not supported");
    assert_eq!(parse_err("x = y[1:2]").message, "slices are not supported");
}

#[test]
fn test_error_line_col() {
    let source = "a = 1\nb = )";
    let err = parse_err(source);
    assert_eq!(err.line_col(source), (2, 5));
}

#[test]
fn test_deeply_nested_expression() {
    let source = format!("x = {}1{}", "(".repeat(2000), ")".repeat(2000));
    assert_eq!(parse_ok(&source).stmts.len(), 1);
}
