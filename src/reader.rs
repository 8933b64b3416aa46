//! Filtering over a stream of records.

use crate::{
    ast::{BinOp, Expr},
    evaluator::{compile, EvalError, Predicate},
    record::Record,
};

/// Wraps a record iterator and yields only the records that pass every
/// appended filter.
///
/// ```
/// use samql::{where_clause, Reader, SamRecord};
///
/// let records: Vec<Result<SamRecord, std::convert::Infallible>> = vec![
///     Ok("r1\t0\tchr1\t10\t30\t4M\t*\t0\t0\tACGT\t*".parse().unwrap()),
///     Ok("r2\t0\tchr2\t10\t30\t4M\t*\t0\t0\tACGT\t*".parse().unwrap()),
/// ];
/// let mut reader = Reader::new(records.into_iter());
/// reader.append_filter(where_clause("RNAME = 'chr2'").unwrap());
///
/// let kept = reader.read_all().unwrap();
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].qname, "r2");
/// ```
pub struct Reader<I> {
    records: I,
    filters: Vec<Predicate>,
}

impl<I> Reader<I> {
    pub fn new(records: I) -> Self {
        Reader {
            records,
            filters: Vec::new(),
        }
    }

    pub fn append_filter(&mut self, filter: Predicate) {
        self.filters.push(filter);
    }

    pub fn filters(&self) -> &[Predicate] {
        &self.filters
    }
}

impl<I, R, E> Reader<I>
where
    I: Iterator<Item = Result<R, E>>,
    R: Record,
{
    /// Next record passing the filters, `None` at end of input.
    pub fn read(&mut self) -> Option<Result<R, E>> {
        self.next()
    }

    /// Every remaining record passing the filters; stops at the first error.
    pub fn read_all(self) -> Result<Vec<R>, E> {
        self.collect()
    }

    fn accepts(&self, record: &R) -> bool {
        self.filters.iter().all(|filter| filter.matches(record))
    }
}

impl<I, R, E> Iterator for Reader<I>
where
    I: Iterator<Item = Result<R, E>>,
    R: Record,
{
    type Item = Result<R, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.records.next()? {
                Ok(record) if !self.accepts(&record) => continue,
                other => return Some(other),
            }
        }
    }
}

fn field_filter(field: &str, op: BinOp, value: Expr) -> Result<Predicate, EvalError> {
    compile(&Expr::binary(op, Expr::var(field), value))
}

/// Filter on the read name.
pub fn qname(value: &str, op: BinOp) -> Result<Predicate, EvalError> {
    field_filter("QNAME", op, Expr::String(value.to_string()))
}

/// Filter on the reference name.
pub fn rname(value: &str, op: BinOp) -> Result<Predicate, EvalError> {
    field_filter("RNAME", op, Expr::String(value.to_string()))
}

/// Filter on the zero-based position.
pub fn pos(value: i64, op: BinOp) -> Result<Predicate, EvalError> {
    field_filter("POS", op, Expr::Integer(value))
}

/// Filter on the number of reference bases covered.
pub fn length(value: i64, op: BinOp) -> Result<Predicate, EvalError> {
    field_filter("LENGTH", op, Expr::Integer(value))
}
