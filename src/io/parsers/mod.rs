//! Parsers for the tab-delimited feature formats.
//!
//! Each parser turns one row of a [`csv`] tab-delimited reader into a
//! `(seqname, Record)` pair in 0-indexed, right-exclusive coordinates:
//!
//!  - [`bed`]: BED3 through BED6+ (0-indexed already; score in column 5, strand in 6).
//!  - [`gff`]: GFF and GTF (1-indexed, inclusive ends; score in column 6, strand in 7).
//!  - [`vcf`]: VCF variants (the span of the reference allele; `QUAL` as the score).

use csv::StringRecord;
use log::debug;
use std::path::Path;
use std::str::FromStr;

use crate::{
    error::GSignalError,
    io::file::InputFile,
    ranges::{Record, Strand},
    sources::SourceKind,
};

pub mod bed;
pub mod gff;
pub mod vcf;

/// A parsed row, or `None` for rows that carry no record (e.g. BED `track` lines).
pub type ParsedRow = Option<(String, Record)>;

/// Render a row back to a line, for error messages.
pub fn row_line(row: &StringRecord) -> String {
    row.iter().collect::<Vec<_>>().join("\t")
}

/// Get column `index` of `row`, erroring if the row is too short.
pub fn column<'a>(row: &'a StringRecord, index: usize) -> Result<&'a str, GSignalError> {
    row.get(index).ok_or_else(|| {
        GSignalError::InvalidRecord(format!(
            "expected at least {} columns, found {}.\nLine: {}",
            index + 1,
            row.len(),
            row_line(row)
        ))
    })
}

/// Parse column `index` of `row` into `T`.
pub fn parse_column<T: FromStr>(row: &StringRecord, index: usize) -> Result<T, GSignalError> {
    let value = column(row, index)?;
    value.trim().parse::<T>().map_err(|_| {
        GSignalError::InvalidRecord(format!(
            "could not parse '{}' as {} in column {}.\nLine: {}",
            value,
            std::any::type_name::<T>(),
            index + 1,
            row_line(row)
        ))
    })
}

/// Parse an optional column, where `.` or an absent column mean no value.
pub fn parse_optional<T: FromStr>(
    row: &StringRecord,
    index: usize,
) -> Result<Option<T>, GSignalError> {
    match row.get(index).map(str::trim) {
        None | Some(".") | Some("") => Ok(None),
        Some(_) => parse_column(row, index).map(Some),
    }
}

/// Parse an optional strand column; absent means unstranded.
pub fn parse_strand(row: &StringRecord, index: usize) -> Result<Strand, GSignalError> {
    match row.get(index).map(str::trim) {
        None | Some("") => Ok(Strand::Unstranded),
        Some(symbol) => symbol.parse(),
    }
}

/// Read every record of a tab-delimited file of `kind`.
pub fn read_records(
    path: impl AsRef<Path>,
    kind: SourceKind,
) -> Result<Vec<(String, Record)>, GSignalError> {
    let parse_row: fn(&StringRecord) -> Result<ParsedRow, GSignalError> = match kind {
        SourceKind::Bed => bed::parse_bed_row,
        SourceKind::Gff | SourceKind::Gtf => gff::parse_gff_row,
        SourceKind::Vcf => vcf::parse_vcf_row,
        _ => {
            return Err(GSignalError::UnsupportedOperation {
                operation: "parse as tab-delimited text",
                kind,
            })
        }
    };

    let mut reader = InputFile::new(path.as_ref()).tsv_reader()?;
    let mut records = Vec::new();
    let mut skipped = 0;
    for row in reader.records() {
        let row = row?;
        if row.len() == 1 && row[0].trim().is_empty() {
            skipped += 1;
            continue;
        }
        match parse_row(&row)? {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(
            "skipped {} non-record lines in {}",
            skipped,
            path.as_ref().display()
        );
    }
    Ok(records)
}
