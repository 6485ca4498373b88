//! bigWig and bigBed sources, via [`bigtools`].
//!
//! A bigWig is a dense signal track: its records are the stored data intervals,
//! unstranded, with the stored value as the score. It also supports the native
//! summary methods (see [`crate::sources::summary`]), where `summarize` may read
//! a zoom level instead of full-resolution data.
//!
//! A bigBed holds BED features; the score and strand come from the fifth and
//! sixth BED columns, which `bigtools` returns as the tab-separated `rest` field.

use bigtools::utils::reopen::ReopenableFile;
use bigtools::{BBIReadError, BigBedRead, BigWigRead, ZoomIntervalError};
use indexmap::IndexMap;
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::{
    binning::Method,
    error::GSignalError,
    ranges::{Interval, Record, Strand},
    sources::{
        summary::{summarize_blocks, summarize_records, SummaryBlock},
        SourceKind,
    },
    traits::SignalSource,
    Position,
};

fn path_str(path: &Path) -> Result<&str, GSignalError> {
    path.to_str().ok_or_else(|| {
        GSignalError::InvalidArgument(format!("path {} is not valid UTF-8", path.display()))
    })
}

/// Map a read error to `None` when the chromosome is simply absent from the file.
fn unknown_chromosome_as_empty<T>(result: Result<T, BBIReadError>) -> Result<Option<T>, GSignalError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(BBIReadError::InvalidChromosome(_)) => Ok(None),
        Err(e) => Err(GSignalError::adapter(e)),
    }
}

fn chrom_sizes(chroms: &[bigtools::ChromInfo]) -> IndexMap<String, Position> {
    chroms
        .iter()
        .map(|chrom| (chrom.name.clone(), chrom.length))
        .collect()
}

pub struct BigWigSource {
    path: PathBuf,
    reader: BigWigRead<ReopenableFile>,
    total: Option<u64>,
}

impl std::fmt::Debug for BigWigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigWigSource")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl BigWigSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GSignalError> {
        let path = path.as_ref().to_path_buf();
        let reader = BigWigRead::open_file(path_str(&path)?).map_err(GSignalError::adapter)?;
        debug!(
            "opened bigWig {} with {} zoom levels",
            path.display(),
            reader.info().zoom_headers.len()
        );
        Ok(Self {
            path,
            reader,
            total: None,
        })
    }

    /// The coarsest zoom level whose reduction is at most half a bin, if any.
    fn zoom_level_for(&self, interval: &Interval, bins: usize) -> Option<u32> {
        let bin_width = interval.len() / bins.max(1);
        self.reader
            .info()
            .zoom_headers
            .iter()
            .map(|zoom| zoom.reduction_level)
            .filter(|level| (*level as usize) * 2 <= bin_width)
            .max()
    }

    fn zoom_blocks(
        &mut self,
        interval: &Interval,
        level: u32,
    ) -> Result<Option<Vec<SummaryBlock>>, GSignalError> {
        let records = match self.reader.get_zoom_interval(
            &interval.seqname,
            interval.start,
            interval.end,
            level,
        ) {
            Ok(records) => records,
            Err(ZoomIntervalError::BBIReadError(BBIReadError::InvalidChromosome(_))) => {
                return Ok(Some(Vec::new()))
            }
            Err(ZoomIntervalError::ReductionLevelNotFound) => return Ok(None),
            Err(e) => return Err(GSignalError::adapter(e)),
        };
        let mut blocks = Vec::new();
        for record in records {
            let record = record.map_err(GSignalError::adapter)?;
            blocks.push(SummaryBlock {
                start: record.start,
                end: record.end,
                sum: record.summary.sum,
                covered: record.summary.bases_covered as f64,
            });
        }
        Ok(Some(blocks))
    }
}

impl SignalSource for BigWigSource {
    fn kind(&self) -> SourceKind {
        SourceKind::BigWig
    }

    fn overlapping_records(&mut self, interval: &Interval) -> Result<Vec<Record>, GSignalError> {
        if interval.is_empty() {
            return Ok(Vec::new());
        }
        let values = self
            .reader
            .get_interval(&interval.seqname, interval.start, interval.end);
        let Some(values) = unknown_chromosome_as_empty(values)? else {
            return Ok(Vec::new());
        };
        let mut records = Vec::new();
        for value in values {
            let value = value.map_err(GSignalError::adapter)?;
            records.push(Record::new(
                value.start,
                value.end,
                Strand::Unstranded,
                Some(f64::from(value.value)),
            ));
        }
        Ok(records)
    }

    fn native_binned_summary(
        &mut self,
        interval: &Interval,
        bins: usize,
        method: Method,
    ) -> Result<Vec<f64>, GSignalError> {
        if !method.is_native() {
            return Err(GSignalError::UnsupportedOperation {
                operation: method.name(),
                kind: SourceKind::BigWig,
            });
        }
        if method == Method::Summarize {
            if let Some(level) = self.zoom_level_for(interval, bins) {
                if let Some(blocks) = self.zoom_blocks(interval, level)? {
                    debug!("summarizing {} from zoom level {}", interval, level);
                    return Ok(summarize_blocks(&blocks, interval, bins, method));
                }
                warn!("zoom level {} could not be read; using full resolution", level);
            }
        }
        let records = self.overlapping_records(interval)?;
        Ok(summarize_records(&records, interval, bins, method))
    }

    /// The number of stored data intervals, counted in one pass over every chromosome.
    fn total_record_count(&mut self, force: bool) -> Result<u64, GSignalError> {
        if let (Some(total), false) = (self.total, force) {
            return Ok(total);
        }
        let chroms = self.reader.chroms().to_vec();
        let mut total = 0;
        for chrom in chroms {
            let values = self.reader.get_interval(&chrom.name, 0, chrom.length);
            if let Some(values) = unknown_chromosome_as_empty(values)? {
                for value in values {
                    value.map_err(GSignalError::adapter)?;
                    total += 1;
                }
            }
        }
        self.total = Some(total);
        Ok(total)
    }

    fn chromosome_sizes(&self) -> Result<IndexMap<String, Position>, GSignalError> {
        Ok(chrom_sizes(self.reader.chroms()))
    }

    fn reopen(&self) -> Result<Box<dyn SignalSource>, GSignalError> {
        let mut source = BigWigSource::open(&self.path)?;
        source.total = self.total;
        Ok(Box::new(source))
    }
}

/// Score and strand from the `rest` columns of a bigBed entry (name, score, strand, ...).
pub fn parse_bed_rest(rest: &str) -> Result<(Option<f64>, Strand), GSignalError> {
    let mut columns = rest.split('\t');
    let _name = columns.next();
    let score = match columns.next().map(str::trim) {
        None | Some("") | Some(".") => None,
        Some(score) => Some(score.parse::<f64>()?),
    };
    let strand = match columns.next().map(str::trim) {
        None | Some("") => Strand::Unstranded,
        Some(symbol) => symbol.parse()?,
    };
    Ok((score, strand))
}

pub struct BigBedSource {
    path: PathBuf,
    reader: BigBedRead<ReopenableFile>,
    total: Option<u64>,
}

impl std::fmt::Debug for BigBedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigBedSource")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl BigBedSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GSignalError> {
        let path = path.as_ref().to_path_buf();
        let reader = BigBedRead::open_file(path_str(&path)?).map_err(GSignalError::adapter)?;
        Ok(Self {
            path,
            reader,
            total: None,
        })
    }
}

impl SignalSource for BigBedSource {
    fn kind(&self) -> SourceKind {
        SourceKind::BigBed
    }

    fn overlapping_records(&mut self, interval: &Interval) -> Result<Vec<Record>, GSignalError> {
        if interval.is_empty() {
            return Ok(Vec::new());
        }
        let entries = self
            .reader
            .get_interval(&interval.seqname, interval.start, interval.end);
        let Some(entries) = unknown_chromosome_as_empty(entries)? else {
            return Ok(Vec::new());
        };
        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(GSignalError::adapter)?;
            let (score, strand) = parse_bed_rest(&entry.rest)?;
            records.push(Record::new(entry.start, entry.end, strand, score));
        }
        Ok(records)
    }

    fn total_record_count(&mut self, force: bool) -> Result<u64, GSignalError> {
        if let (Some(total), false) = (self.total, force) {
            return Ok(total);
        }
        let chroms = self.reader.chroms().to_vec();
        let mut total = 0;
        for chrom in chroms {
            let entries = self.reader.get_interval(&chrom.name, 0, chrom.length);
            if let Some(entries) = unknown_chromosome_as_empty(entries)? {
                for entry in entries {
                    entry.map_err(GSignalError::adapter)?;
                    total += 1;
                }
            }
        }
        self.total = Some(total);
        Ok(total)
    }

    fn chromosome_sizes(&self) -> Result<IndexMap<String, Position>, GSignalError> {
        Ok(chrom_sizes(self.reader.chroms()))
    }

    fn reopen(&self) -> Result<Box<dyn SignalSource>, GSignalError> {
        let mut source = BigBedSource::open(&self.path)?;
        source.total = self.total;
        Ok(Box::new(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bed_rest() {
        assert_eq!(
            parse_bed_rest("read1\t255\t-").unwrap(),
            (Some(255.0), Strand::Reverse)
        );
        assert_eq!(
            parse_bed_rest("read1\t.\t.\textra").unwrap(),
            (None, Strand::Unstranded)
        );
        assert_eq!(parse_bed_rest("").unwrap(), (None, Strand::Unstranded));
        assert!(parse_bed_rest("read1\t1\tx").is_err());
    }

    #[test]
    fn test_missing_files() {
        assert!(BigWigSource::open("tests_data/does_not_exist.bw").is_err());
        assert!(BigBedSource::open("tests_data/does_not_exist.bb").is_err());
    }
}
