//! SAM text output for filtered records.
//!
//! Records are written one per line in column order, header first. Counting
//! mode writes a single number instead.
//!
//! # Examples
//!
//! ```
//! use samql::output::SamWriter;
//! use samql::SamRecord;
//!
//! let record: SamRecord = "r1\t0\tchr1\t10\t30\t4M\t*\t0\t0\tACGT\t*".parse().unwrap();
//! let mut writer = SamWriter::new(Vec::new());
//! writer.write_record(&record).unwrap();
//!
//! let text = String::from_utf8(writer.into_inner()).unwrap();
//! assert_eq!(text, "r1\t0\tchr1\t10\t30\t4M\t*\t0\t0\tACGT\t*\n");
//! ```

use std::io::{self, Write};

use crate::sam::{Header, SamRecord};

pub struct SamWriter<W: Write> {
    out: W,
}

impl<W: Write> SamWriter<W> {
    pub fn new(out: W) -> Self {
        SamWriter { out }
    }

    pub fn write_header(&mut self, header: &Header) -> io::Result<()> {
        write!(self.out, "{}", header)
    }

    pub fn write_record(&mut self, record: &SamRecord) -> io::Result<()> {
        writeln!(self.out, "{}", record)
    }

    pub fn write_count(&mut self, count: usize) -> io::Result<()> {
        writeln!(self.out, "{}", count)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
