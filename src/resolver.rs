//! Maps identifiers to typed per-record accessors.
//!
//! Resolution order: the fixed field table, then the tag address form
//! `XX:T` (two letters, a colon, a type code). Anything else is not a field.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::evaluator::EvalError;
use crate::record::{flag, Record};
use crate::value::Value;

pub type IntAccessor = Arc<dyn Fn(&dyn Record) -> i64 + Send + Sync>;
pub type FloatAccessor = Arc<dyn Fn(&dyn Record) -> f32 + Send + Sync>;
pub type StrAccessor = Arc<dyn Fn(&dyn Record) -> String + Send + Sync>;
pub type BoolAccessor = Arc<dyn Fn(&dyn Record) -> bool + Send + Sync>;

/// Static type of a resolved field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
    String,
    Boolean,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::String => "string",
            FieldKind::Boolean => "boolean",
        })
    }
}

/// A function reading one typed value from a record.
#[derive(Clone)]
pub enum Accessor {
    Int(IntAccessor),
    Float(FloatAccessor),
    Str(StrAccessor),
    Bool(BoolAccessor),
}

impl Accessor {
    pub fn kind(&self) -> FieldKind {
        match self {
            Accessor::Int(_) => FieldKind::Integer,
            Accessor::Float(_) => FieldKind::Float,
            Accessor::Str(_) => FieldKind::String,
            Accessor::Bool(_) => FieldKind::Boolean,
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accessor::{:?}", self.kind())
    }
}

#[derive(Clone, Copy)]
enum FixedField {
    Int(fn(&dyn Record) -> i64),
    Str(fn(&dyn Record) -> String),
    Flag(u16),
}

impl FixedField {
    fn kind(self) -> FieldKind {
        match self {
            FixedField::Int(_) => FieldKind::Integer,
            FixedField::Str(_) => FieldKind::String,
            FixedField::Flag(_) => FieldKind::Boolean,
        }
    }

    fn accessor(self) -> Accessor {
        match self {
            FixedField::Int(f) => Accessor::Int(Arc::new(f)),
            FixedField::Str(f) => Accessor::Str(Arc::new(f)),
            FixedField::Flag(bit) => {
                Accessor::Bool(Arc::new(move |r: &dyn Record| r.flag() & bit == bit))
            }
        }
    }
}

// Ordered for listing; looked up through FIXED_FIELDS.
const FIELD_TABLE: &[(&str, FixedField)] = &[
    ("QNAME", FixedField::Str(|r| r.qname().to_string())),
    ("FLAG", FixedField::Int(|r| i64::from(r.flag()))),
    ("RNAME", FixedField::Str(|r| r.rname().to_string())),
    ("POS", FixedField::Int(|r| r.pos())),
    ("MAPQ", FixedField::Int(|r| i64::from(r.mapq()))),
    ("CIGAR", FixedField::Str(|r| r.cigar().to_string())),
    ("RNEXT", FixedField::Str(|r| r.rnext().to_string())),
    ("PNEXT", FixedField::Int(|r| r.pnext())),
    ("TLEN", FixedField::Int(|r| r.tlen())),
    ("SEQ", FixedField::Str(|r| r.seq().to_string())),
    ("QUAL", FixedField::Str(|r| r.qual().to_string())),
    ("LENGTH", FixedField::Int(|r| r.alignment_len())),
    ("END", FixedField::Int(|r| r.end())),
    ("PAIRED", FixedField::Flag(flag::PAIRED)),
    ("PROPERPAIR", FixedField::Flag(flag::PROPER_PAIR)),
    ("UNMAPPED", FixedField::Flag(flag::UNMAPPED)),
    ("MATEUNMAPPED", FixedField::Flag(flag::MATE_UNMAPPED)),
    ("REVERSE", FixedField::Flag(flag::REVERSE)),
    ("MATEREVERSE", FixedField::Flag(flag::MATE_REVERSE)),
    ("READ1", FixedField::Flag(flag::READ1)),
    ("READ2", FixedField::Flag(flag::READ2)),
    ("SECONDARY", FixedField::Flag(flag::SECONDARY)),
    ("QCFAIL", FixedField::Flag(flag::QC_FAIL)),
    ("DUPLICATE", FixedField::Flag(flag::DUPLICATE)),
    ("SUPPLEMENTARY", FixedField::Flag(flag::SUPPLEMENTARY)),
];

static FIXED_FIELDS: LazyLock<HashMap<&'static str, FixedField>> =
    LazyLock::new(|| FIELD_TABLE.iter().copied().collect());

/// Fixed field keywords with their kinds, in table order.
pub fn keywords() -> impl Iterator<Item = (&'static str, FieldKind)> {
    FIELD_TABLE.iter().map(|(name, field)| (*name, field.kind()))
}

/// Split a tag address such as `NM:i` into its key and type code.
fn tag_address(name: &str) -> Option<(&str, char)> {
    match name.as_bytes() {
        [a, b, b':', code, ..]
            if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() && b"AifZHB".contains(code) =>
        {
            Some((&name[..2], char::from(*code)))
        }
        _ => None,
    }
}

/// Resolve an identifier to an accessor.
///
/// `Ok(None)` means the identifier is not a field and is taken as text.
/// Tag addresses with the `H` or `B` codes are rejected.
pub fn resolve(name: &str) -> Result<Option<Accessor>, EvalError> {
    if let Some(field) = FIXED_FIELDS.get(name) {
        return Ok(Some(field.accessor()));
    }

    let Some((key, code)) = tag_address(name) else {
        return Ok(None);
    };
    let key = key.to_string();

    // A tag that is absent, or stored with another type, reads as zero.
    let accessor = match code {
        'i' => Accessor::Int(Arc::new(move |r: &dyn Record| {
            r.tag(&key).and_then(Value::as_int).unwrap_or(0)
        })),
        'f' => Accessor::Float(Arc::new(move |r: &dyn Record| {
            r.tag(&key).and_then(Value::as_float).unwrap_or(0.0)
        })),
        'Z' => Accessor::Str(Arc::new(move |r: &dyn Record| match r.tag(&key) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        })),
        'A' => Accessor::Str(Arc::new(move |r: &dyn Record| match r.tag(&key) {
            Some(Value::Char(c)) => c.to_string(),
            _ => String::new(),
        })),
        code => {
            return Err(EvalError::UnsupportedTagType {
                name: name.to_string(),
                code,
            });
        }
    };
    Ok(Some(accessor))
}
