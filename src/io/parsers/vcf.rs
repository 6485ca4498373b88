//! VCF parsing.
//!
//! A variant spans its reference allele, starting at `POS` (1-indexed). `QUAL` is
//! the record's score; variants carry no strand. Header lines all begin with `#`
//! and are skipped by the reader.

use csv::StringRecord;

use super::{column, parse_column, parse_optional, ParsedRow};
use crate::{
    error::GSignalError,
    ranges::{Record, Strand},
    Position,
};

/// Parse one VCF data row.
pub fn parse_vcf_row(row: &StringRecord) -> Result<ParsedRow, GSignalError> {
    let seqname = column(row, 0)?.trim().to_string();
    let pos: Position = parse_column(row, 1)?;
    let reference = column(row, 3)?.trim();
    let start = pos.saturating_sub(1);
    let end = start + Position::try_from(reference.len().max(1)).unwrap_or(1);
    let quality: Option<f64> = parse_optional(row, 5)?;
    Ok(Some((
        seqname,
        Record::new(start, end, Strand::Unstranded, quality),
    )))
}
