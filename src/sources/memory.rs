//! [`InMemorySource`]: a [`SignalSource`] over a [`RecordIndex`] held in memory.
//!
//! The tab-delimited feature formats (BED, GFF, GTF, VCF) are small enough to be
//! loaded once and queried through interval trees. The same type also serves data
//! built in code, under any [`SourceKind`]: an in-memory source of kind
//! [`SourceKind::BigWig`] behaves as a dense track, including its native summaries.

use log::info;
use std::path::Path;
use std::sync::Arc;

use crate::{
    binning::Method,
    error::GSignalError,
    io::parsers::read_records,
    ranges::{coitrees::RecordIndex, Interval, Record},
    sources::{summary::summarize_records, SourceKind},
    traits::SignalSource,
};

/// An in-memory, interval-tree indexed source. Cloning (and [`SignalSource::reopen`])
/// shares the index.
#[derive(Clone, Debug)]
pub struct InMemorySource {
    kind: SourceKind,
    index: Arc<RecordIndex>,
    total: Option<u64>,
}

impl InMemorySource {
    /// Build a source of `kind` from `(seqname, record)` pairs.
    pub fn from_records<I>(kind: SourceKind, records: I) -> Result<Self, GSignalError>
    where
        I: IntoIterator<Item = (String, Record)>,
    {
        let index = RecordIndex::from_records(records)?;
        Ok(Self {
            kind,
            index: Arc::new(index),
            total: None,
        })
    }

    /// Load a BED, GFF, GTF or VCF file (plain or gzip-compressed).
    pub fn open(path: impl AsRef<Path>, kind: SourceKind) -> Result<Self, GSignalError> {
        let path = path.as_ref();
        if !kind.is_text() {
            return Err(GSignalError::UnsupportedOperation {
                operation: "load into memory",
                kind,
            });
        }
        let records = read_records(path, kind)?;
        let source = Self::from_records(kind, records)?;
        info!(
            "loaded {} {} records from {}",
            source.index.len(),
            kind,
            path.display()
        );
        Ok(source)
    }
}

impl SignalSource for InMemorySource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn overlapping_records(&mut self, interval: &Interval) -> Result<Vec<Record>, GSignalError> {
        Ok(self.index.overlapping(interval))
    }

    fn native_binned_summary(
        &mut self,
        interval: &Interval,
        bins: usize,
        method: Method,
    ) -> Result<Vec<f64>, GSignalError> {
        if !self.supports_native_binning() || !method.is_native() {
            return Err(GSignalError::UnsupportedOperation {
                operation: method.name(),
                kind: self.kind,
            });
        }
        let records = self.index.overlapping(interval);
        Ok(summarize_records(&records, interval, bins, method))
    }

    fn total_record_count(&mut self, force: bool) -> Result<u64, GSignalError> {
        match self.total {
            Some(total) if !force => Ok(total),
            _ => {
                let total = self.index.len() as u64;
                self.total = Some(total);
                Ok(total)
            }
        }
    }

    fn reopen(&self) -> Result<Box<dyn SignalSource>, GSignalError> {
        Ok(Box::new(self.clone()))
    }
}
