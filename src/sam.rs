//! Minimal SAM text decoding: one record per tab-separated line, header
//! lines starting with `@`.

use std::fmt;
use std::io::{self, BufRead};
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::record::Record;
use crate::value::Value;

/// A single line that is not a valid SAM record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("invalid {field} {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("invalid tag {0:?}")]
    InvalidTag(String),
}

#[derive(Debug, Error)]
pub enum SamError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("line {line}: {source}")]
    Record { line: usize, source: RecordError },
}

/// A decoded SAM alignment line.
///
/// `pos` and `pnext` are zero-based; `rnext` keeps the text form, so `=`
/// survives a round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct SamRecord {
    pub qname: String,
    pub flag: u16,
    pub rname: String,
    pub pos: i64,
    pub mapq: u8,
    pub cigar: String,
    pub rnext: String,
    pub pnext: i64,
    pub tlen: i64,
    pub seq: String,
    pub qual: String,
    pub tags: Vec<(String, Value)>,
}

fn parse_field<T: FromStr>(text: &str, field: &'static str) -> Result<T, RecordError> {
    text.parse().map_err(|_| RecordError::InvalidField {
        field,
        value: text.to_string(),
    })
}

// One-based text column to a zero-based position.
fn parse_position(text: &str, field: &'static str) -> Result<i64, RecordError> {
    parse_field::<i64>(text, field)?
        .checked_sub(1)
        .ok_or_else(|| RecordError::InvalidField {
            field,
            value: text.to_string(),
        })
}

fn parse_tag(text: &str) -> Result<(String, Value), RecordError> {
    let invalid = || RecordError::InvalidTag(text.to_string());

    let mut parts = text.splitn(3, ':');
    let (Some(key), Some(code), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let mut code_chars = code.chars();
    let (Some(code), None) = (code_chars.next(), code_chars.next()) else {
        return Err(invalid());
    };
    if key.len() != 2 || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid());
    }

    let value = Value::parse(code, value).ok_or_else(invalid)?;
    Ok((key.to_string(), value))
}

impl FromStr for SamRecord {
    type Err = RecordError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut columns = line.split('\t');
        let mut next = |field| columns.next().ok_or(RecordError::MissingField(field));

        let qname = next("QNAME")?.to_string();
        let flag = parse_field(next("FLAG")?, "FLAG")?;
        let rname = next("RNAME")?.to_string();
        let pos = parse_position(next("POS")?, "POS")?;
        let mapq = parse_field(next("MAPQ")?, "MAPQ")?;
        let cigar = next("CIGAR")?.to_string();
        let rnext = next("RNEXT")?.to_string();
        let pnext = parse_position(next("PNEXT")?, "PNEXT")?;
        let tlen = parse_field(next("TLEN")?, "TLEN")?;
        let seq = next("SEQ")?.to_string();
        let qual = next("QUAL")?.to_string();
        let tags = columns.map(parse_tag).collect::<Result<_, _>>()?;

        Ok(SamRecord {
            qname,
            flag,
            rname,
            pos,
            mapq,
            cigar,
            rnext,
            pnext,
            tlen,
            seq,
            qual,
            tags,
        })
    }
}

impl fmt::Display for SamRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.qname,
            self.flag,
            self.rname,
            self.pos.saturating_add(1),
            self.mapq,
            self.cigar,
            self.rnext,
            self.pnext.saturating_add(1),
            self.tlen,
            self.seq,
            self.qual,
        )?;
        for (key, value) in &self.tags {
            write!(f, "\t{}:{}:{}", key, value.type_code(), value)?;
        }
        Ok(())
    }
}

impl Record for SamRecord {
    fn qname(&self) -> &str {
        &self.qname
    }

    fn flag(&self) -> u16 {
        self.flag
    }

    fn rname(&self) -> &str {
        &self.rname
    }

    fn pos(&self) -> i64 {
        self.pos
    }

    fn mapq(&self) -> u8 {
        self.mapq
    }

    fn cigar(&self) -> &str {
        &self.cigar
    }

    fn rnext(&self) -> &str {
        if self.rnext == "=" {
            &self.rname
        } else {
            &self.rnext
        }
    }

    fn pnext(&self) -> i64 {
        self.pnext
    }

    fn tlen(&self) -> i64 {
        self.tlen
    }

    fn seq(&self) -> &str {
        &self.seq
    }

    fn qual(&self) -> &str {
        &self.qual
    }

    fn tag(&self, key: &str) -> Option<&Value> {
        self.tags.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// SAM header lines, kept verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    lines: Vec<String>,
}

impl Header {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add the lines of `other` that are not already present. Only the first
    /// `@HD` line is kept.
    pub fn merge(&mut self, other: &Header) {
        let has_hd = self.lines.iter().any(|l| l.starts_with("@HD"));
        for line in &other.lines {
            if line.starts_with("@HD") && has_hd {
                continue;
            }
            if !self.lines.contains(line) {
                self.lines.push(line.clone());
            }
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Reads the header eagerly, then yields records lazily.
pub struct SamReader<R> {
    lines: io::Lines<R>,
    header: Header,
    pending: Option<String>,
    line: usize,
}

impl<R: BufRead> SamReader<R> {
    pub fn new(reader: R) -> Result<Self, SamError> {
        let mut lines = reader.lines();
        let mut header = Header::default();
        let mut pending = None;
        let mut line = 0;

        for text in lines.by_ref() {
            let text = text?;
            line += 1;
            if text.starts_with('@') {
                header.lines.push(text);
            } else {
                pending = Some(text);
                break;
            }
        }
        debug!(lines = header.lines.len(), "read SAM header");

        Ok(SamReader {
            lines,
            header,
            pending,
            line,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }
}

impl<R: BufRead> Iterator for SamReader<R> {
    type Item = Result<SamRecord, SamError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.pending.take() {
                Some(text) => text,
                None => match self.lines.next()? {
                    Ok(text) => {
                        self.line += 1;
                        text
                    }
                    Err(err) => return Some(Err(err.into())),
                },
            };
            if text.is_empty() {
                continue;
            }
            let line = self.line;
            return Some(
                text.parse()
                    .map_err(|source| SamError::Record { line, source }),
            );
        }
    }
}
