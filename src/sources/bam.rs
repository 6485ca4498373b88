//! [`BamSource`]: aligned reads from an indexed BAM file, via [`noodles`].
//!
//! Each mapped read is one record spanning its alignment, on the `-` strand when
//! reverse-complemented. Unmapped reads are skipped. Queries need the BAM index
//! (`.bai`) next to the file.
//!
//! Only the path and header are held; each query opens its own indexed reader, so
//! a source never carries reader state between calls.

use indexmap::IndexMap;
use log::{debug, info};
use noodles::bam;
use noodles::bgzf;
use noodles::core::{Position as CorePosition, Region};
use noodles::sam;
use noodles::sam::alignment::Record as SamRecord;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::{
    error::GSignalError,
    ranges::{Interval, Record, Strand},
    sources::SourceKind,
    traits::SignalSource,
    Position,
};

type IndexedBamReader = bam::io::IndexedReader<bgzf::Reader<File>>;

pub struct BamSource {
    path: PathBuf,
    header: sam::Header,
    total: Option<u64>,
}

impl std::fmt::Debug for BamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BamSource")
            .field("path", &self.path)
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

/// Convert a 1-based alignment position to a 0-based [`Position`].
fn to_position(position: CorePosition) -> Result<Position, GSignalError> {
    Position::try_from(position.get()).map_err(|_| {
        GSignalError::InvalidRecord(format!("alignment position {} is out of range", position))
    })
}

impl BamSource {
    /// Open an indexed BAM file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GSignalError> {
        let path = path.as_ref().to_path_buf();
        let (_, header) = Self::indexed_reader(&path)?;
        debug!(
            "opened {} with {} reference sequences",
            path.display(),
            header.reference_sequences().len()
        );
        Ok(Self {
            path,
            header,
            total: None,
        })
    }

    fn indexed_reader(path: &Path) -> Result<(IndexedBamReader, sam::Header), GSignalError> {
        let mut reader = bam::io::indexed_reader::Builder::default().build_from_path(path)?;
        let header = reader.read_header()?;
        Ok((reader, header))
    }

    fn has_reference_sequence(&self, seqname: &str) -> bool {
        self.header
            .reference_sequences()
            .keys()
            .any(|name| name == seqname)
    }

    /// Convert a BAM record to a [`Record`], or `None` for unmapped reads.
    fn convert(record: &bam::Record) -> Result<Option<Record>, GSignalError> {
        let flags = record.flags();
        if flags.is_unmapped() {
            return Ok(None);
        }
        let (Some(start), Some(end)) = (
            record.alignment_start().transpose()?,
            SamRecord::alignment_end(record).transpose()?,
        ) else {
            return Ok(None);
        };
        let strand = if flags.is_reverse_complemented() {
            Strand::Reverse
        } else {
            Strand::Forward
        };
        // 1-based inclusive to 0-based right-exclusive
        let start = to_position(start)? - 1;
        let end = to_position(end)?;
        Ok(Some(Record::new(start, end, strand, None)))
    }
}

impl SignalSource for BamSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Bam
    }

    fn overlapping_records(&mut self, interval: &Interval) -> Result<Vec<Record>, GSignalError> {
        if interval.is_empty() || !self.has_reference_sequence(&interval.seqname) {
            return Ok(Vec::new());
        }
        let (Some(start), Some(end)) = (
            CorePosition::new(interval.start as usize + 1),
            CorePosition::new(interval.end as usize),
        ) else {
            return Ok(Vec::new());
        };
        let region = Region::new(interval.seqname.as_str(), start..=end);

        let (mut reader, header) = Self::indexed_reader(&self.path)?;
        let mut records = Vec::new();
        for result in reader.query(&header, &region)? {
            let record = result?;
            if let Some(record) = Self::convert(&record)? {
                if record.end > interval.start && record.start < interval.end {
                    records.push(record);
                }
            }
        }
        Ok(records)
    }

    /// The number of mapped reads, counted in one pass over the file.
    fn total_record_count(&mut self, force: bool) -> Result<u64, GSignalError> {
        if let (Some(total), false) = (self.total, force) {
            return Ok(total);
        }
        let mut reader = bam::io::reader::Builder::default().build_from_reader(File::open(&self.path)?);
        reader.read_header()?;
        let mut total = 0;
        for result in reader.records() {
            let record = result?;
            if !record.flags().is_unmapped() {
                total += 1;
            }
        }
        info!("{} has {} mapped reads", self.path.display(), total);
        self.total = Some(total);
        Ok(total)
    }

    fn chromosome_sizes(&self) -> Result<IndexMap<String, Position>, GSignalError> {
        let mut sizes = IndexMap::new();
        for (name, reference_sequence) in self.header.reference_sequences() {
            let length = Position::try_from(reference_sequence.length().get()).map_err(|_| {
                GSignalError::InvalidRecord(format!("reference sequence {} is too long", name))
            })?;
            sizes.insert(name.to_string(), length);
        }
        Ok(sizes)
    }

    fn reopen(&self) -> Result<Box<dyn SignalSource>, GSignalError> {
        Ok(Box::new(BamSource {
            path: self.path.clone(),
            header: self.header.clone(),
            total: self.total,
        }))
    }
}
