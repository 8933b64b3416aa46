// tests/parser_tests.rs

use samql::ast::{BinOp, Expr, Field, Pos, RegexLiteral, Statement};
use samql::lexer::{LexError, Lexer};
use samql::parser::{parse_expr, parse_statement, ParseError, Params, Parser};

fn var(name: &str) -> Expr {
    Expr::var(name)
}

fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(op, lhs, rhs)
}

fn paren(expr: Expr) -> Expr {
    Expr::Paren(Box::new(expr))
}

fn error_message(input: &str) -> String {
    parse_statement(input).unwrap_err().to_string()
}

// ============================================================================
// Precedence and Associativity
// ============================================================================

#[test]
fn test_multiplication_binds_tighter() {
    assert_eq!(
        parse_expr("1 + 2 * 3").unwrap(),
        bin(
            BinOp::Add,
            Expr::Integer(1),
            bin(BinOp::Mul, Expr::Integer(2), Expr::Integer(3))
        )
    );
}

#[test]
fn test_left_associativity() {
    assert_eq!(
        parse_expr("a - b - c").unwrap(),
        bin(BinOp::Sub, bin(BinOp::Sub, var("a"), var("b")), var("c"))
    );
    assert_eq!(
        parse_expr("a AND b AND c").unwrap(),
        bin(BinOp::And, bin(BinOp::And, var("a"), var("b")), var("c"))
    );
}

#[test]
fn test_and_binds_tighter_than_or() {
    assert_eq!(
        parse_expr("a OR b AND c").unwrap(),
        bin(BinOp::Or, var("a"), bin(BinOp::And, var("b"), var("c")))
    );
    assert_eq!(
        parse_expr("a AND b OR c").unwrap(),
        bin(BinOp::Or, bin(BinOp::And, var("a"), var("b")), var("c"))
    );
}

#[test]
fn test_bitmask_comparison() {
    assert_eq!(
        parse_expr("FLAG & 16 = 16 AND PAIRED").unwrap(),
        bin(
            BinOp::And,
            bin(
                BinOp::Eq,
                bin(BinOp::BitwiseAnd, var("FLAG"), Expr::Integer(16)),
                Expr::Integer(16)
            ),
            var("PAIRED")
        )
    );
}

#[test]
fn test_parentheses() {
    assert_eq!(
        parse_expr("(1 + 2) * 3").unwrap(),
        bin(
            BinOp::Mul,
            paren(bin(BinOp::Add, Expr::Integer(1), Expr::Integer(2))),
            Expr::Integer(3)
        )
    );
    assert_eq!(
        parse_expr("RNAME = 'chr2' AND (POS = 6 OR QNAME = 'r002')").unwrap(),
        bin(
            BinOp::And,
            bin(BinOp::Eq, var("RNAME"), Expr::String("chr2".to_string())),
            paren(bin(
                BinOp::Or,
                bin(BinOp::Eq, var("POS"), Expr::Integer(6)),
                bin(BinOp::Eq, var("QNAME"), Expr::String("r002".to_string()))
            ))
        )
    );
}

#[test]
fn test_unclosed_paren() {
    assert!(matches!(
        parse_expr("(a = 1"),
        Err(ParseError::Unexpected { ref found, ref expected, .. })
            if found == "EOF" && expected == &vec![")"]
    ));
}

// ============================================================================
// Literals and Unary Signs
// ============================================================================

#[test]
fn test_literals() {
    let test_cases = vec![
        ("42", Expr::Integer(42)),
        ("0.0903", Expr::Number(0.0903)),
        ("100.", Expr::Number(100.0)),
        ("'chr1'", Expr::String("chr1".to_string())),
        ("\"chr1\"", var("chr1")),
        ("TRUE", Expr::Boolean(true)),
        ("false", Expr::Boolean(false)),
        ("NM:i", var("NM:i")),
    ];

    for (input, expected) in test_cases {
        assert_eq!(parse_expr(input).unwrap(), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_signs_fold_into_literals() {
    let test_cases = vec![
        ("-5", Expr::Integer(-5)),
        ("+7", Expr::Integer(7)),
        ("-1.5", Expr::Number(-1.5)),
        ("-9223372036854775808", Expr::Integer(i64::MIN)),
        ("9223372036854775808", Expr::Unsigned(1 << 63)),
        ("18446744073709551615", Expr::Unsigned(u64::MAX)),
        ("+9223372036854775808", Expr::Unsigned(1 << 63)),
    ];

    for (input, expected) in test_cases {
        assert_eq!(parse_expr(input).unwrap(), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_sign_on_expression_multiplies() {
    assert_eq!(
        parse_expr("-POS").unwrap(),
        bin(BinOp::Mul, Expr::Integer(-1), var("POS"))
    );
    assert_eq!(
        parse_expr("-(a)").unwrap(),
        bin(BinOp::Mul, Expr::Integer(-1), paren(var("a")))
    );
    assert_eq!(
        parse_expr("de:f != -60000").unwrap(),
        bin(BinOp::Neq, var("de:f"), Expr::Integer(-60000))
    );
}

#[test]
fn test_integer_limits() {
    assert_eq!(
        parse_expr("-9223372036854775809").unwrap_err(),
        ParseError::Underflow(9223372036854775809)
    );
    assert_eq!(
        parse_expr("-9223372036854775809").unwrap_err().to_string(),
        "constant -9223372036854775809 underflows int64"
    );
    assert_eq!(
        parse_expr("18446744073709551616").unwrap_err().to_string(),
        "unable to parse integer at line 1, char 1"
    );
}

#[test]
fn test_sign_needs_operand() {
    assert_eq!(
        parse_expr("- 'x'").unwrap_err(),
        ParseError::Unexpected {
            found: "x".to_string(),
            expected: vec!["identifier", "number", "("],
            pos: Pos::new(0, 2),
        }
    );
}

#[test]
fn test_trailing_tokens() {
    assert_eq!(
        parse_expr("a b").unwrap_err().to_string(),
        "found b, expected EOF at line 1, char 3"
    );
}

// ============================================================================
// Calls and Regex
// ============================================================================

#[test]
fn test_calls() {
    assert_eq!(
        parse_expr("MEAN(value, /x/)").unwrap(),
        Expr::Call {
            name: "mean".to_string(),
            args: vec![var("value"), Expr::Regex(RegexLiteral::new("x").unwrap())],
        }
    );
    assert_eq!(
        parse_expr("now()").unwrap(),
        Expr::Call {
            name: "now".to_string(),
            args: vec![],
        }
    );
    assert!(matches!(
        parse_expr("f(a b)"),
        Err(ParseError::Unexpected { ref found, .. }) if found == "b"
    ));
}

#[test]
fn test_regex_operands() {
    match parse_expr("QNAME =~ /^r00[12]$/").unwrap() {
        Expr::Binary {
            op: BinOp::EqRegex,
            lhs,
            rhs,
        } => {
            assert_eq!(*lhs, var("QNAME"));
            match *rhs {
                Expr::Regex(re) => assert_eq!(re.pattern(), "^r00[12]$"),
                other => panic!("Expected regex, got {:?}", other),
            }
        }
        other => panic!("Expected regex match, got {:?}", other),
    }

    // Comments may sit between the operator and the pattern
    assert!(parse_expr("RNAME !~ /* not chr1 */ /^chr1/").is_ok());
}

#[test]
fn test_regex_required_after_match_operator() {
    assert_eq!(
        parse_expr("QNAME =~ 'x'").unwrap_err().to_string(),
        "found x, expected regex at line 1, char 10"
    );
    assert!(matches!(
        parse_expr("QNAME =~ /(/"),
        Err(ParseError::Invalid { .. })
    ));
    assert!(matches!(
        parse_expr("QNAME =~ /abc"),
        Err(ParseError::Lex(LexError::BadRegex { .. }))
    ));
}

#[test]
fn test_lex_errors_surface() {
    assert!(matches!(
        parse_expr("'unterminated"),
        Err(ParseError::Lex(LexError::BadString { .. }))
    ));
    assert!(matches!(
        parse_expr("'a\\qb'"),
        Err(ParseError::Lex(LexError::BadEscape { .. }))
    ));
}

// ============================================================================
// Bound Parameters
// ============================================================================

#[test]
fn test_bound_parameters() {
    let params: Params = serde_json::from_str(r#"{"chrom": "chr1", "min": 30, "host name": 1.5}"#)
        .unwrap();
    let mut parser =
        Parser::new(Lexer::new("RNAME = $chrom AND MAPQ >= $min")).with_params(params.clone());
    assert_eq!(
        parser.parse().unwrap(),
        bin(
            BinOp::And,
            bin(BinOp::Eq, var("RNAME"), Expr::String("chr1".to_string())),
            bin(BinOp::Gte, var("MAPQ"), Expr::Integer(30))
        )
    );

    let mut parser = Parser::new(Lexer::new("$\"host name\"")).with_params(params);
    assert_eq!(parser.parse().unwrap(), Expr::Number(1.5));
}

#[test]
fn test_missing_parameter() {
    assert_eq!(
        parse_expr("POS > $min").unwrap_err().to_string(),
        "missing parameter: min"
    );
    assert_eq!(
        parse_expr("POS > $").unwrap_err().to_string(),
        "empty bound parameter at line 1, char 7"
    );
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_select_all() {
    let statement = parse_statement("SELECT * FROM records").unwrap();
    let select = statement.as_select();
    assert_eq!(select.fields.len(), 1);
    assert_eq!(select.fields[0], Field::new(Expr::Wildcard));
    assert_eq!(select.source.name, "records");
    assert_eq!(select.condition, None);
}

#[test]
fn test_select_with_condition() {
    let statement = parse_statement("select * from records where POS > 15;").unwrap();
    assert_eq!(
        statement,
        Statement::Select(samql::SelectStatement {
            fields: samql::ast::Fields(vec![Field::new(Expr::Wildcard)]),
            source: samql::ast::Table {
                name: "records".to_string(),
            },
            condition: Some(bin(BinOp::Gt, var("POS"), Expr::Integer(15))),
        })
    );
}

#[test]
fn test_select_fields_and_aliases() {
    let statement =
        parse_statement("SELECT POS AS start, /^r0/, mean(MAPQ) FROM \"my reads\"").unwrap();
    let select = statement.as_select();
    assert_eq!(select.fields.len(), 3);
    assert_eq!(select.fields[0].alias.as_deref(), Some("start"));
    assert!(matches!(select.fields[1].expr, Expr::Regex(_)));
    assert!(matches!(select.fields[2].expr, Expr::Call { .. }));
    assert_eq!(select.source.name, "my reads");
}

#[test]
fn test_statement_spanning_lines() {
    let input = "SELECT QNAME\r\n/* every read */\nFROM records\nWHERE\n  MAPQ >= 30";
    let statement = parse_statement(input).unwrap();
    assert_eq!(
        statement.as_select().condition,
        Some(bin(BinOp::Gte, var("MAPQ"), Expr::Integer(30)))
    );
}

#[test]
fn test_statement_error_messages() {
    let test_cases = vec![
        ("UNKNOWN", "found UNKNOWN, expected SELECT at line 1, char 1"),
        ("SELECT 10.5h FROM myseries", "found h, expected FROM at line 1, char 12"),
        ("SELECT field1 X", "found X, expected FROM at line 1, char 15"),
        ("SELECT a FROM 'x'", "found x, expected identifier at line 1, char 15"),
        ("SELECT a FROM t; b", "found b, expected EOF at line 1, char 18"),
        ("SELECT a FROM t b", "found b, expected ;, EOF at line 1, char 17"),
        (
            "SELECT value > 2 FROM cpu",
            "invalid operator > in SELECT clause at line 1, char 8; operator is intended for WHERE clause",
        ),
        (
            "SELECT\n  a, b AND c FROM cpu",
            "invalid operator AND in SELECT clause at line 2, char 6; operator is intended for WHERE clause",
        ),
    ];

    for (input, expected) in test_cases {
        assert_eq!(error_message(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_arithmetic_allowed_in_fields() {
    let statement = parse_statement("SELECT POS + 1, FLAG & 16 FROM records").unwrap();
    assert_eq!(statement.as_select().fields.len(), 2);
}
