//! The [`GenomicSignal`] facade: one entry point over any [`SignalSource`].
//!
//! This is the only place options are validated, so every check runs before a
//! query touches any data.

use indexmap::IndexMap;
use log::info;
use std::path::Path;

use crate::{
    batch::{batch_array, dispatch, BatchResult},
    binning::{interval_signal, Signal},
    error::GSignalError,
    options::Options,
    ranges::{Interval, IntervalSpec},
    sources::{memory::InMemorySource, SourceKind},
    traits::SignalSource,
    validation::{validate_count, validate_options},
    Position,
};

pub use crate::sources::supported_formats;

/// Genomic signal over one data source.
pub struct GenomicSignal {
    source: Box<dyn SignalSource>,
}

impl std::fmt::Debug for GenomicSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenomicSignal")
            .field("kind", &self.source.kind())
            .finish_non_exhaustive()
    }
}

/// Open `path` as a source of the kind named `kind` (e.g. `"bam"`, `"bigwig"`).
pub fn genomic_signal(path: impl AsRef<Path>, kind: &str) -> Result<GenomicSignal, GSignalError> {
    GenomicSignal::open(path, kind.parse()?)
}

impl GenomicSignal {
    /// Open a file as a source of `kind`.
    pub fn open(path: impl AsRef<Path>, kind: SourceKind) -> Result<Self, GSignalError> {
        let path = path.as_ref();
        info!("opening {} as a {} source", path.display(), kind);
        let source: Box<dyn SignalSource> = match kind {
            SourceKind::Bed | SourceKind::Gff | SourceKind::Gtf | SourceKind::Vcf => {
                Box::new(InMemorySource::open(path, kind)?)
            }
            #[cfg(feature = "bam")]
            SourceKind::Bam => Box::new(crate::sources::bam::BamSource::open(path)?),
            #[cfg(feature = "bbi")]
            SourceKind::BigWig => Box::new(crate::sources::bbi::BigWigSource::open(path)?),
            #[cfg(feature = "bbi")]
            SourceKind::BigBed => Box::new(crate::sources::bbi::BigBedSource::open(path)?),
            #[allow(unreachable_patterns)]
            _ => {
                return Err(GSignalError::UnsupportedSourceKind(
                    kind.to_string(),
                    "this build was compiled without support for it".to_string(),
                ))
            }
        };
        Ok(Self { source })
    }

    /// Wrap an existing source.
    pub fn from_source(source: impl SignalSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    pub fn from_boxed(source: Box<dyn SignalSource>) -> Self {
        Self { source }
    }

    pub fn kind(&self) -> SourceKind {
        self.source.kind()
    }

    /// The number of records overlapping `interval`; with `stranded`, only those on
    /// the interval's strand (unstranded intervals are not restricted).
    pub fn count(&mut self, interval: &Interval, stranded: bool) -> Result<u64, GSignalError> {
        validate_count(self.kind(), stranded)?;
        self.source.count(interval, stranded)
    }

    /// The signal over one spec. Multi-interval specs are concatenated in order,
    /// with their sub-intervals spread over `options.processes` workers.
    pub fn local_coverage(
        &mut self,
        spec: &IntervalSpec,
        options: &Options,
    ) -> Result<Signal, GSignalError> {
        validate_options(self.kind(), options, 1)?;
        let bins = options.bins.as_ref().and_then(|bins| bins.for_row(0));
        let mut signal = match spec {
            IntervalSpec::Single(interval) => {
                interval_signal(self.source.as_mut(), interval, bins, options)?
            }
            IntervalSpec::Multi(intervals) => {
                let parts = dispatch(
                    self.source.as_mut(),
                    intervals,
                    options.processes,
                    |handle, _, interval| interval_signal(handle, interval, bins, options),
                )?;
                Signal::concat(parts)
            }
        };
        if options.preserve_total {
            signal.normalize();
        }
        Ok(signal)
    }

    /// Evaluate many specs at once, one output row per spec, in input order.
    pub fn array(
        &mut self,
        specs: &[IntervalSpec],
        options: &Options,
    ) -> Result<BatchResult, GSignalError> {
        validate_options(self.kind(), options, specs.len())?;
        batch_array(self.source.as_mut(), specs, options)
    }

    /// The total number of records in the source (cached; `force` recomputes).
    pub fn total_record_count(&mut self, force: bool) -> Result<u64, GSignalError> {
        self.source.total_record_count(force)
    }

    /// Alias of [`GenomicSignal::total_record_count`], for aligned reads.
    pub fn mapped_read_count(&mut self, force: bool) -> Result<u64, GSignalError> {
        self.total_record_count(force)
    }

    pub fn chromosome_sizes(&self) -> Result<IndexMap<String, Position>, GSignalError> {
        self.source.chromosome_sizes()
    }
}
