//! BED parsing.
//!
//! The BED (Browser Extensible Format) is a TSV format in bioinformatics. In
//! practice it is quite permissive, so any row with at least the three range
//! columns is accepted; `name`, `score` and `strand` are read when present, and
//! `.` marks a missing score or strand.

use csv::StringRecord;

use super::{column, parse_column, parse_optional, parse_strand, ParsedRow};
use crate::{error::GSignalError, ranges::Record, Position};

/// Parse one BED row. `track` and `browser` lines yield `None`.
pub fn parse_bed_row(row: &StringRecord) -> Result<ParsedRow, GSignalError> {
    let seqname = column(row, 0)?.trim();
    if matches!(seqname.split_whitespace().next(), Some("track" | "browser")) {
        return Ok(None);
    }
    let start: Position = parse_column(row, 1)?;
    let end: Position = parse_column(row, 2)?;
    if start > end {
        return Err(GSignalError::InvalidInterval(start, end));
    }
    let score: Option<f64> = parse_optional(row, 4)?;
    let strand = parse_strand(row, 5)?;
    Ok(Some((
        seqname.to_string(),
        Record::new(start, end, strand, score),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranges::Strand;

    #[test]
    fn test_bed6() {
        let row = StringRecord::from(vec!["chr2L", "70", "75", "read2", "255", "-"]);
        let (seqname, record) = parse_bed_row(&row).unwrap().unwrap();
        assert_eq!(seqname, "chr2L");
        assert_eq!(record, Record::new(70, 75, Strand::Reverse, Some(255.0)));
    }

    #[test]
    fn test_bed3_and_missing_values() {
        let row = StringRecord::from(vec!["chr1", "0", "10"]);
        let (_, record) = parse_bed_row(&row).unwrap().unwrap();
        assert_eq!(record, Record::new(0, 10, Strand::Unstranded, None));

        let row = StringRecord::from(vec!["chr1", "0", "10", "x", ".", "."]);
        let (_, record) = parse_bed_row(&row).unwrap().unwrap();
        assert_eq!(record.score, None);
        assert_eq!(record.strand, Strand::Unstranded);
    }

    #[test]
    fn test_track_lines_skipped() {
        let row = StringRecord::from(vec!["track name=reads"]);
        assert!(parse_bed_row(&row).unwrap().is_none());
    }

    #[test]
    fn test_invalid_rows() {
        let row = StringRecord::from(vec!["chr1", "10", "5"]);
        assert!(parse_bed_row(&row).is_err());
        let row = StringRecord::from(vec!["chr1", "a", "5"]);
        assert!(parse_bed_row(&row).is_err());
    }
}
