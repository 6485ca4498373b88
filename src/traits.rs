//! Traits used by the gsignal library.
//!

use indexmap::IndexMap;

use crate::{
    binning::Method,
    error::GSignalError,
    ranges::{Interval, Record, Strand},
    sources::{Capabilities, SourceKind},
    Position,
};

/// The [`GenericRange`] trait defines common functionality for all range types.
pub trait GenericRange {
    fn start(&self) -> Position;
    fn end(&self) -> Position;
    fn width(&self) -> Position {
        self.end() - self.start()
    }
    /// Whether this range overlaps another, using half-open coordinates.
    fn overlaps<R: GenericRange>(&self, other: &R) -> bool {
        self.overlap_width(other) > 0
    }
    /// Calculate how many basepairs overlap this range and other.
    fn overlap_width<R: GenericRange>(&self, other: &R) -> Position {
        let overlap_start = std::cmp::max(self.start(), other.start());
        let overlap_end = std::cmp::min(self.end(), other.end());
        if overlap_start >= overlap_end {
            return 0;
        }
        overlap_end.saturating_sub(overlap_start)
    }

    /// Return a tuple of the range created by an overlap with another range; `None` if no overlap.
    fn overlap_range<R: GenericRange>(&self, other: &R) -> Option<(Position, Position)> {
        let overlap_start = std::cmp::max(self.start(), other.start());
        let overlap_end = std::cmp::min(self.end(), other.end());

        if overlap_start < overlap_end {
            Some((overlap_start, overlap_end))
        } else {
            None
        }
    }
}

/// The [`SignalSource`] trait is the contract every data source satisfies: given an
/// [`Interval`], supply the records overlapping it. Everything downstream (coverage,
/// binning, batching) only sees this trait.
///
/// Implementations declare their [`Capabilities`] through their [`SourceKind`]; the
/// option validator consults these before any I/O happens.
pub trait SignalSource: Send {
    /// The kind of source, e.g. [`SourceKind::Bam`].
    fn kind(&self) -> SourceKind;

    fn capabilities(&self) -> Capabilities {
        self.kind().capabilities()
    }

    /// All records overlapping `interval` (half-open overlap), in arbitrary order.
    /// The interval's strand is ignored.
    fn overlapping_records(&mut self, interval: &Interval) -> Result<Vec<Record>, GSignalError>;

    /// Count the records overlapping `interval`. If `stranded` is set and the interval
    /// has a strand, only records on the same strand are counted.
    fn count(&mut self, interval: &Interval, stranded: bool) -> Result<u64, GSignalError> {
        let records = self.overlapping_records(interval)?;
        let restrict = stranded && interval.strand != Strand::Unstranded;
        let n = records
            .iter()
            .filter(|record| !restrict || record.strand == interval.strand)
            .count();
        Ok(n as u64)
    }

    fn supports_native_binning(&self) -> bool {
        self.capabilities().native_binning
    }

    /// Summarize `interval` into `bins` values with a format-native method, in increasing
    /// genomic order.
    fn native_binned_summary(
        &mut self,
        interval: &Interval,
        bins: usize,
        method: Method,
    ) -> Result<Vec<f64>, GSignalError> {
        let _ = (interval, bins);
        Err(GSignalError::UnsupportedOperation {
            operation: method.name(),
            kind: self.kind(),
        })
    }

    /// The total number of records (e.g. mapped reads) in this source. The value is
    /// cached after the first call; `force` recomputes it.
    fn total_record_count(&mut self, force: bool) -> Result<u64, GSignalError>;

    /// Sequence names and lengths, in the order the source declares them.
    fn chromosome_sizes(&self) -> Result<IndexMap<String, Position>, GSignalError> {
        Err(GSignalError::UnsupportedOperation {
            operation: "chromosome_sizes",
            kind: self.kind(),
        })
    }

    /// Open an independent handle onto the same data, for use by another worker.
    fn reopen(&self) -> Result<Box<dyn SignalSource>, GSignalError>;
}
