// tests/integration_tests.rs

use samql::ast::BinOp;
use samql::reader::{self, Reader};
use samql::{where_clause, where_clause_with_params, Predicate, SamReader, SamRecord};

const SAM_DATA: &str = "@HD\tVN:1.5\tSO:coordinate
@SQ\tSN:chr1\tLN:45
@SQ\tSN:chr2\tLN:100
@SQ\tSN:1\tLN:45
r001\t99\tchr1\t7\t30\t8M2I4M1D3M\t=\t37\t39\tTTAGATAAAGGATACTG\t*
r002\t0\tchr1\t9\t30\t3S6M1P1I4M\t*\t0\t0\tAAAAGATAAGGATA\t*
r003\t0\tchr1\t16\t30\t6M14N5M\t*\t0\t0\tATAGCTTCAGC\t*
r001\t147\tchr1\t37\t30\t9M\t=\t7\t-39\tCAGCGGCAT\t*\tNM:i:1\tMD:Z:TAT\tde:f:0.0903
r004\t3840\tchr2\t40\t30\t6M14N5M\t*\t0\t0\tATAGCTTCAGC\t*
r005\t0\t1\t40\t29\t6M14N5M\t*\t0\t0\tATAGCTTCAGC\t*\tNM:i:60000\tMD:A:T
r006\t77\t*\t0\t0\t*\t*\t0\t0\tCAGCGTGCATGCTACGATAGCAT\t*
r006\t141\t*\t0\t0\t*\t*\t0\t0\tCGATCGATCGAGCTAGCTAGCT\t*
";

fn read_with(filters: Vec<Predicate>) -> Vec<SamRecord> {
    let source = SamReader::new(SAM_DATA.as_bytes()).unwrap();
    let mut reader = Reader::new(source);
    for filter in filters {
        reader.append_filter(filter);
    }
    reader.read_all().unwrap()
}

fn count(query: &str) -> usize {
    let filter = where_clause(query)
        .unwrap_or_else(|e| panic!("Failed to compile {}: {}", query, e));
    read_with(vec![filter]).len()
}

// ============================================================================
// WHERE Clauses over a SAM Stream
// ============================================================================

#[test]
fn test_no_filter_reads_everything() {
    assert_eq!(read_with(vec![]).len(), 8);
}

#[test]
fn test_fixed_field_queries() {
    let test_cases = vec![
        ("RNAME=\"chr1\" AND QNAME = \"r001\"", 2),
        ("(RNAME=\"chr1\" AND QNAME = \"r001\") OR RNAME=\"chr2\"", 3),
        ("RNAME=\"chr1\" AND POS=15", 1),
        ("RNAME!=\"chr2\"", 7),
        ("RNAME=~/^chr1/", 4),
        ("RNAME!~/^chr1/", 4),
        ("POS < 15", 4),
        ("POS <= 15", 5),
        ("POS > 15", 3),
        ("POS >= 15", 4),
        ("RNAME = 'chr1'", 4),
        ("POS > 15.0", 3),
        ("RNAME = \"chr2\" AND POS = 6 OR QNAME = \"r002\"", 1),
        ("RNAME = \"chr2\" AND (POS = 6 OR QNAME = \"r002\")", 0),
        ("FLAG & 1 = 1", 4),
        ("POS = 1", 0),
        ("RNAME = 1", 1),
        ("RNAME = RNEXT", 4),
        ("MAPQ < 30", 3),
        ("PNEXT >= 36", 1),
        ("TLEN != 39", 7),
        ("LENGTH <= 9", 3),
        ("CIGAR =~ /^[68]M/", 4),
        ("SEQ =~ /^AT/", 3),
    ];

    for (query, expected) in test_cases {
        assert_eq!(count(query), expected, "Failed for query: {}", query);
    }
}

#[test]
fn test_tag_queries() {
    let test_cases = vec![
        ("NM:i = 1", 1),
        ("NM:i >= 60000", 1),
        ("NM:i = NM:i", 8),
        ("NM:i = de:f", 6),
        ("de:f = 0.0903", 1),
        ("de:f > 0.0900000000", 1),
        ("de:f <= de:f", 8),
        ("de:f != -60000", 8),
        ("de:f >= NM:i", 6),
        ("MD:A = T", 1),
        ("MD:Z = TAT", 1),
    ];

    for (query, expected) in test_cases {
        assert_eq!(count(query), expected, "Failed for query: {}", query);
    }
}

#[test]
fn test_flag_queries() {
    let test_cases = vec![
        ("PAIRED = TRUE", 4),
        ("PAIRED", 4),
        ("PAIRED AND PROPERPAIR AND REVERSE AND READ2", 1),
        ("PAIRED AND MATEREVERSE AND READ1", 1),
        ("SECONDARY AND QCFAIL AND DUPLICATE AND SUPPLEMENTARY", 1),
        ("PAIRED AND UNMAPPED AND MATEUNMAPPED", 2),
        ("PAIRED AND PAIRED", 4),
        ("QNAME = r001 AND PAIRED", 2),
        ("PAIRED AND QNAME = r001", 2),
        ("TRUE AND QNAME = r001 AND TRUE", 2),
        ("TRUE", 8),
        ("PAIRED = FALSE", 4),
    ];

    for (query, expected) in test_cases {
        assert_eq!(count(query), expected, "Failed for query: {}", query);
    }
}

#[test]
fn test_bound_parameters() {
    let params = serde_json::from_str(r#"{"chrom": "chr1", "min": 15}"#).unwrap();
    let filter = where_clause_with_params("RNAME = $chrom AND POS >= $min", params).unwrap();
    let records = read_with(vec![filter]);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].qname, "r003");
    assert_eq!(records[1].qname, "r001");
}

#[test]
fn test_compile_errors_surface_before_reading() {
    assert!(matches!(where_clause("POS >"), Err(samql::Error::Parse(_))));
    assert!(matches!(where_clause("FLAG = r001"), Err(samql::Error::Eval(_))));
    assert!(matches!(where_clause("POS = 1; x"), Err(samql::Error::Parse(_))));
    assert_eq!(
        where_clause("UNKNOWN = ").unwrap_err().to_string(),
        "found EOF, expected identifier, string, number, bool at line 1, char 39"
    );
}

// ============================================================================
// Reader Convenience Filters
// ============================================================================

#[test]
fn test_convenience_filters() {
    assert_eq!(read_with(vec![reader::rname("chr1", BinOp::Eq).unwrap()]).len(), 4);
    assert_eq!(read_with(vec![reader::qname("r001", BinOp::Eq).unwrap()]).len(), 2);
    assert_eq!(read_with(vec![reader::pos(15, BinOp::Gte).unwrap()]).len(), 4);
    assert_eq!(read_with(vec![reader::length(9, BinOp::Lte).unwrap()]).len(), 3);
    assert!(reader::pos(15, BinOp::Add).is_err());
}

#[test]
fn test_filters_are_combined_with_and() {
    let records = read_with(vec![
        reader::rname("chr1", BinOp::Eq).unwrap(),
        where_clause("POS > 15").unwrap(),
    ]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].pos, 36);
    assert_eq!(records[0].flag, 147);
}

#[test]
fn test_read_one_at_a_time() {
    let source = SamReader::new(SAM_DATA.as_bytes()).unwrap();
    assert_eq!(source.header().lines().len(), 4);

    let mut reader = Reader::new(source);
    reader.append_filter(where_clause("QNAME = r006").unwrap());
    assert_eq!(reader.filters().len(), 1);

    let first = reader.read().unwrap().unwrap();
    assert_eq!(first.flag, 77);
    let second = reader.read().unwrap().unwrap();
    assert_eq!(second.flag, 141);
    assert!(reader.read().is_none());
}

#[test]
fn test_malformed_record_is_reported() {
    let data = "r1\t0\tchr1\t1\t30\t4M\t*\t0\t0\tACGT\t*\nr2\tbad\tchr1\n";
    let mut reader = Reader::new(SamReader::new(data.as_bytes()).unwrap());
    assert!(reader.read().unwrap().is_ok());
    let err = reader.read().unwrap().unwrap_err();
    assert_eq!(err.to_string(), "line 2: invalid FLAG \"bad\"");
}

// ============================================================================
// CLI Commands
// ============================================================================

#[cfg(feature = "cli")]
mod cli {
    use super::SAM_DATA;
    use samql::cli::{compile_filter, execute_check, filter_sources, parse_params, FilterOptions};
    use samql::SamReader;

    #[test]
    fn test_filter_merges_headers_across_inputs() {
        let other = "@HD\tVN:1.6\n@SQ\tSN:chr3\tLN:10\nr9\t0\tchr3\t1\t30\t4M\t*\t0\t0\tACGT\t*\n";
        let options = FilterOptions {
            query: Some("MAPQ >= $min".to_string()),
            params: parse_params(&["min=30"]).unwrap(),
            ..Default::default()
        };
        let filter = compile_filter(&options).unwrap();
        let sources = vec![
            SamReader::new(SAM_DATA.as_bytes()).unwrap(),
            SamReader::new(other.as_bytes()).unwrap(),
        ];

        let mut out = Vec::new();
        let matched = filter_sources(filter.as_ref(), sources, false, &mut out).unwrap();
        assert_eq!(matched, 6);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "@HD\tVN:1.5\tSO:coordinate");
        assert_eq!(lines[4], "@SQ\tSN:chr3\tLN:10");
        assert_eq!(lines.len(), 5 + 6);
        assert_eq!(
            lines[5],
            "r001\t99\tchr1\t7\t30\t8M2I4M1D3M\t=\t37\t39\tTTAGATAAAGGATACTG\t*"
        );
        assert!(lines[10].starts_with("r9\t"));
    }

    #[test]
    fn test_filter_count() {
        let options = FilterOptions {
            query: Some("PAIRED".to_string()),
            count: true,
            ..Default::default()
        };
        let filter = compile_filter(&options).unwrap();
        let sources = vec![SamReader::new(SAM_DATA.as_bytes()).unwrap()];
        let mut out = Vec::new();
        filter_sources(filter.as_ref(), sources, true, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "4\n");
    }

    #[test]
    fn test_check_command() {
        let params = parse_params(&["chrom=chr2"]).unwrap();
        assert_eq!(
            execute_check("RNAME=$chrom and MAPQ>10", &params).unwrap(),
            "SELECT * FROM records WHERE RNAME = 'chr2' AND MAPQ > 10"
        );
        assert!(execute_check("POS + 1 > 2", &params).is_err());
    }
}
