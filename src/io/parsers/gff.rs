//! GFF and GTF parsing.
//!
//! Both share the same nine leading columns; only the attribute column differs,
//! and it is not needed here. Coordinates are 1-indexed with inclusive ends.

use csv::StringRecord;

use super::{column, parse_column, parse_optional, parse_strand, row_line, ParsedRow};
use crate::{error::GSignalError, ranges::Record, Position};

/// Parse one GFF/GTF row.
pub fn parse_gff_row(row: &StringRecord) -> Result<ParsedRow, GSignalError> {
    let seqname = column(row, 0)?.trim().to_string();
    let start: Position = parse_column(row, 3)?;
    let end: Position = parse_column(row, 4)?;
    if start == 0 {
        return Err(GSignalError::InvalidRecord(format!(
            "GFF positions are 1-indexed, found start 0.\nLine: {}",
            row_line(row)
        )));
    }
    if start > end {
        return Err(GSignalError::InvalidInterval(start, end));
    }
    let score: Option<f64> = parse_optional(row, 5)?;
    let strand = parse_strand(row, 6)?;
    Ok(Some((seqname, Record::new(start - 1, end, strand, score))))
}
