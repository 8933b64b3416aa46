// tests/ast_tests.rs

use std::ops::ControlFlow;

use samql::ast::{walk, walk_fn, BinOp, Expr, Node, Visitor};
use samql::parser::{parse_expr, parse_statement};

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_expressions_round_trip() {
    let test_cases = vec![
        "RNAME = 'chr1' AND (POS > 15 OR NM:i = 1)",
        "QNAME =~ /^r00[12]$/",
        "RNAME !~ /a\\/b/",
        "FLAG & 16 = 16",
        "-POS < 3",
        "-(POS + 1) > 0",
        "de:f > 0.0903",
        "POS > 15.0",
        "\"odd name\" = 'it\\'s'",
        "mean(MAPQ, /x/) > 1",
        "\"my f\"(POS) > 1",
        "\"select\"(a, b) = 2",
        "PAIRED = FALSE OR TRUE",
        "9223372036854775808",
    ];

    for input in test_cases {
        let expr = parse_expr(input).unwrap();
        let rendered = expr.to_string();
        let reparsed = parse_expr(&rendered).unwrap();
        assert_eq!(reparsed, expr, "Failed for input: {} (rendered {})", input, rendered);
    }
}

#[test]
fn test_rendering_normalizes_text() {
    let test_cases = vec![
        ("rname=\"chr1\"and pos>=10", "rname = chr1 AND pos >= 10"),
        ("POS>15.", "POS > 15.0"),
        ("(a)OR(b)", "(a) OR (b)"),
        ("\"select\" = 1", "\"select\" = 1"),
        ("x = 'a\\nb'", "x = 'a\\nb'"),
        ("QNAME =~ /a\\/b/", "QNAME =~ /a\\/b/"),
        ("-5", "-5"),
        ("- MAPQ", "-MAPQ"),
        ("\"my f\"(x,y)", "\"my f\"(x, y)"),
        ("\"mean\"(x)", "mean(x)"),
    ];

    for (input, expected) in test_cases {
        assert_eq!(parse_expr(input).unwrap().to_string(), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_statement_rendering() {
    let statement =
        parse_statement("select POS as start, mean(MAPQ) from records where FLAG & 16 = 16;")
            .unwrap();
    let rendered = statement.to_string();
    assert_eq!(
        rendered,
        "SELECT POS AS start, mean(MAPQ) FROM records WHERE FLAG & 16 = 16"
    );
    assert_eq!(parse_statement(&rendered).unwrap(), statement);
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn test_expression_names() {
    let test_cases = vec![
        ("POS", "POS"),
        ("mean(MAPQ)", "mean"),
        ("(POS)", "POS"),
        ("POS + MAPQ", "POS_MAPQ"),
        ("(POS + mean(value)) * MAPQ", "POS_mean_MAPQ"),
        ("1 + 2", ""),
        ("'x'", ""),
    ];

    for (input, expected) in test_cases {
        assert_eq!(parse_expr(input).unwrap().name(), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_column_names_are_unique() {
    let statement =
        parse_statement("SELECT POS, POS, mean(x) AS m, POS + MAPQ, POS AS POS_1, POS FROM t")
            .unwrap();
    let select = statement.as_select();
    assert_eq!(
        select.column_names(),
        vec!["POS", "POS_2", "m", "POS_MAPQ", "POS_1", "POS_3"]
    );
    assert_eq!(
        select.fields.names(),
        vec!["POS", "POS", "m", "POS_MAPQ", "POS_1", "POS"]
    );
}

// ============================================================================
// Traversal
// ============================================================================

#[derive(Default)]
struct VarCollector {
    names: Vec<String>,
}

impl Visitor for VarCollector {
    fn visit(&mut self, node: Node<'_>) -> ControlFlow<()> {
        if let Node::Expr(Expr::VarRef(name)) = node {
            self.names.push(name.clone());
        }
        ControlFlow::Continue(())
    }
}

#[test]
fn test_visitor_sees_fields_then_condition() {
    let statement = parse_statement("SELECT a, f(b) FROM t WHERE c = 1 AND (d OR e)").unwrap();
    let mut collector = VarCollector::default();
    walk(&mut collector, Node::from(&statement));
    assert_eq!(collector.names, vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn test_walk_fn_can_prune() {
    let expr = parse_expr("a = 1 AND (b = 2 OR c = 3)").unwrap();
    let mut ops = Vec::new();
    walk_fn(Node::from(&expr), |node| match node {
        Node::Expr(Expr::Paren(_)) => false,
        Node::Expr(Expr::Binary { op, .. }) => {
            ops.push(*op);
            true
        }
        _ => true,
    });
    assert_eq!(ops, vec![BinOp::And, BinOp::Eq]);
}
