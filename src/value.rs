use std::fmt;

/// Value of an optional record tag.
///
/// The variant follows the SAM type code of the tag:
///
/// | Code | Variant |
/// |---|---|
/// | `A` | [`Value::Char`] |
/// | `i` | [`Value::Int`] |
/// | `f` | [`Value::Float`] |
/// | `Z` | [`Value::String`] |
/// | `H` | [`Value::Hex`] |
/// | `B` | [`Value::Array`] |
///
/// # Examples
///
/// ```
/// use samql::Value;
///
/// let nm = Value::parse('i', "3").unwrap();
/// assert_eq!(nm, Value::Int(3));
/// assert_eq!(nm.type_code(), 'i');
/// assert_eq!(Value::parse('i', "three"), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Single printable character
    Char(char),

    /// Signed integer
    Int(i64),

    /// Single-precision float
    Float(f32),

    /// Printable string
    String(String),

    /// Hex-encoded byte array, kept as text
    Hex(String),

    /// Numeric array with its element subtype (`cCsSiIf`)
    Array(char, Vec<f64>),
}

impl Value {
    pub fn type_code(&self) -> char {
        match self {
            Value::Char(_) => 'A',
            Value::Int(_) => 'i',
            Value::Float(_) => 'f',
            Value::String(_) => 'Z',
            Value::Hex(_) => 'H',
            Value::Array(..) => 'B',
        }
    }

    /// Decode the text form of a tag value for the given type code.
    pub fn parse(code: char, text: &str) -> Option<Self> {
        match code {
            'A' => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Value::Char(c)),
                    _ => None,
                }
            }
            'i' => text.parse().ok().map(Value::Int),
            'f' => text.parse().ok().map(Value::Float),
            'Z' => Some(Value::String(text.to_string())),
            'H' if text.len() % 2 == 0 && text.chars().all(|c| c.is_ascii_hexdigit()) => {
                Some(Value::Hex(text.to_string()))
            }
            'B' => {
                let mut parts = text.split(',');
                let subtype = parts.next()?;
                let mut chars = subtype.chars();
                let subtype = match (chars.next(), chars.next()) {
                    (Some(c), None) if "cCsSiIf".contains(c) => c,
                    _ => return None,
                };
                let values = parts.map(|v| v.parse().ok()).collect::<Option<Vec<f64>>>()?;
                Some(Value::Array(subtype, values))
            }
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Char(c) => write!(f, "{}", c),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) | Value::Hex(s) => f.write_str(s),
            Value::Array(subtype, values) => {
                write!(f, "{}", subtype)?;
                for v in values {
                    write!(f, ",{}", v)?;
                }
                Ok(())
            }
        }
    }
}
