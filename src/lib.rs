//! # gsignal
//!
//! Per-base and binned signal profiles from genomic interval queries, with one
//! interface across aligned reads (BAM), annotated features (BED, GFF, GTF, VCF,
//! bigBed) and dense signal tracks (bigWig).
//!
//! ```no_run
//! use gsignal::prelude::*;
//!
//! # fn main() -> Result<(), GSignalError> {
//! let mut signal = genomic_signal("tests_data/gdc.bed", "bed")?;
//! let interval: Interval = "chr2L:1-20".parse()?;
//! let options = Options::default().bins(8);
//! let profile = signal.local_coverage(&interval.into(), &options)?;
//! assert_eq!(profile.y.len(), 8);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod binning;
pub mod coverage;
pub mod error;
pub mod io;
pub mod options;
pub mod ranges;
pub mod signal;
pub mod sources;
pub mod test_utilities;
pub mod traits;
pub mod validation;

pub type Position = u32;
pub type PositionOffset = i64;

pub mod prelude {
    pub use crate::batch::{BatchResult, Signal};
    pub use crate::binning::Method;
    pub use crate::error::GSignalError;
    pub use crate::options::{Bins, OptionName, Options};
    pub use crate::ranges::{Interval, IntervalSpec, Record, Strand};
    pub use crate::signal::{genomic_signal, supported_formats, GenomicSignal};
    pub use crate::sources::{memory::InMemorySource, Capabilities, SourceKind};
    pub use crate::traits::{GenericRange, SignalSource};
}
