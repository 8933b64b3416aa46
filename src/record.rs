//! The record surface queries are evaluated against.

use crate::value::Value;

/// Bits of the FLAG field.
pub mod flag {
    pub const PAIRED: u16 = 0x1;
    pub const PROPER_PAIR: u16 = 0x2;
    pub const UNMAPPED: u16 = 0x4;
    pub const MATE_UNMAPPED: u16 = 0x8;
    pub const REVERSE: u16 = 0x10;
    pub const MATE_REVERSE: u16 = 0x20;
    pub const READ1: u16 = 0x40;
    pub const READ2: u16 = 0x80;
    pub const SECONDARY: u16 = 0x100;
    pub const QC_FAIL: u16 = 0x200;
    pub const DUPLICATE: u16 = 0x400;
    pub const SUPPLEMENTARY: u16 = 0x800;
}

/// One alignment record.
///
/// Positions are zero-based; an unplaced record reports `-1`.
pub trait Record {
    fn qname(&self) -> &str;
    fn flag(&self) -> u16;
    /// Reference name, `*` when unplaced
    fn rname(&self) -> &str;
    fn pos(&self) -> i64;
    fn mapq(&self) -> u8;
    fn cigar(&self) -> &str;
    /// Mate reference name with `=` already resolved to [`Record::rname`]
    fn rnext(&self) -> &str;
    fn pnext(&self) -> i64;
    fn tlen(&self) -> i64;
    fn seq(&self) -> &str;
    fn qual(&self) -> &str;

    /// Optional tag by its two-character key.
    fn tag(&self, key: &str) -> Option<&Value>;

    /// Zero-based position one past the last reference base covered.
    fn end(&self) -> i64 {
        self.pos().saturating_add(reference_span(self.cigar()))
    }

    /// Number of reference bases covered by the alignment.
    fn alignment_len(&self) -> i64 {
        self.end().saturating_sub(self.pos())
    }
}

/// Reference bases consumed by a CIGAR string (`M`, `D`, `N`, `=`, `X`).
///
/// ```
/// use samql::record::reference_span;
///
/// assert_eq!(reference_span("8M2I4M1D3M"), 16);
/// assert_eq!(reference_span("*"), 0);
/// ```
pub fn reference_span(cigar: &str) -> i64 {
    let mut span: i64 = 0;
    let mut len: i64 = 0;
    for ch in cigar.chars() {
        if let Some(digit) = ch.to_digit(10) {
            len = len.saturating_mul(10).saturating_add(i64::from(digit));
            continue;
        }
        if matches!(ch, 'M' | 'D' | 'N' | '=' | 'X') {
            span = span.saturating_add(len);
        }
        len = 0;
    }
    span
}
