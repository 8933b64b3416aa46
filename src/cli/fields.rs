//! Field reference for the samql CLI

use std::fmt::Write;

use crate::resolver::keywords;

const OPERATORS: &str = r#"OPERATORS (loosest to tightest)

  OR
  AND
  =  !=  <  <=  >  >=  =~  !~
  +  -  |  ^
  *  /  %  &

  Regular expressions are written between slashes: QNAME =~ /^r00[12]$/
  Bound parameters are written $name and supplied with --param name=value.
"#;

const TAGS: &str = r#"OPTIONAL TAGS

  XX:A              single character, compared as a string
  XX:i              signed integer
  XX:f              float
  XX:Z              string
  XX:H, XX:B        not supported in filters

  A record without the tag reads as 0, 0.0 or the empty string.
"#;

/// Describe every field a WHERE clause can reference.
pub fn fields_overview() -> String {
    let mut out = String::from("SAMQL FIELDS\n\n");
    for (name, kind) in keywords() {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "  {:<18}{}", name, kind);
    }
    out.push('\n');
    out.push_str(TAGS);
    out.push('\n');
    out.push_str(OPERATORS);
    out
}
