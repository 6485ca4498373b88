//! Query options, shared by [`local_coverage`] and [`array`].
//!
//! [`Options`] can be built in code with its builder methods, or read from a TOML
//! document:
//!
//! ```
//! use gsignal::prelude::*;
//!
//! let options = Options::from_toml_str(r#"
//!     bins = 8
//!     method = "bin_covered"
//!     fragment_size = 200
//! "#).unwrap();
//! assert_eq!(options.bins, Some(Bins::Fixed(8)));
//! assert_eq!(options.method, Some(Method::BinCovered));
//! ```
//!
//! [`local_coverage`]: crate::signal::GenomicSignal::local_coverage
//! [`array`]: crate::signal::GenomicSignal::array

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{binning::Method, error::GSignalError, ranges::Strand, Position, PositionOffset};

/// The number of bins: one count for every row, or one count per row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bins {
    Fixed(usize),
    PerInterval(Vec<usize>),
}

impl Bins {
    /// The number of bins for row `index`, if defined.
    pub fn for_row(&self, index: usize) -> Option<usize> {
        match self {
            Bins::Fixed(n) => Some(*n),
            Bins::PerInterval(counts) => counts.get(index).copied(),
        }
    }
}

/// Query options. All fields default to "no effect"; see the builder methods.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Build separate plus and minus strand tracks.
    pub stranded: bool,
    /// Move records downstream by this many bases (upstream for minus-strand records).
    pub shift_width: PositionOffset,
    /// Extend (or truncate) records to this length from their 5' end.
    pub fragment_size: Option<Position>,
    /// Only use records on this strand.
    pub read_strand: Option<Strand>,
    /// Weight records by their score rather than 1.
    pub use_score: bool,
    pub bins: Option<Bins>,
    pub method: Option<Method>,
    /// Overlapping records add (true) or do not (false).
    pub accumulate: bool,
    /// Divide each output row by its sum.
    pub preserve_total: bool,
    /// Allow rows of unequal length in batch output.
    pub ragged: bool,
    /// Number of batch workers.
    pub processes: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            stranded: false,
            shift_width: 0,
            fragment_size: None,
            read_strand: None,
            use_score: false,
            bins: None,
            method: None,
            accumulate: true,
            preserve_total: false,
            ragged: false,
            processes: 1,
        }
    }
}

impl Options {
    /// Read options from a TOML document. Unknown keys and badly typed values
    /// (e.g. `bins = "a"`) are argument errors.
    pub fn from_toml_str(text: &str) -> Result<Self, GSignalError> {
        toml::from_str(text).map_err(|e| GSignalError::InvalidArgument(e.message().to_string()))
    }

    pub fn stranded(mut self, stranded: bool) -> Self {
        self.stranded = stranded;
        self
    }

    pub fn shift_width(mut self, shift_width: PositionOffset) -> Self {
        self.shift_width = shift_width;
        self
    }

    pub fn fragment_size(mut self, fragment_size: Position) -> Self {
        self.fragment_size = Some(fragment_size);
        self
    }

    pub fn read_strand(mut self, strand: Strand) -> Self {
        self.read_strand = Some(strand);
        self
    }

    pub fn use_score(mut self, use_score: bool) -> Self {
        self.use_score = use_score;
        self
    }

    /// Use `bins` bins for every row.
    pub fn bins(mut self, bins: usize) -> Self {
        self.bins = Some(Bins::Fixed(bins));
        self
    }

    /// Use a separate number of bins for each row.
    pub fn bins_per_interval(mut self, bins: Vec<usize>) -> Self {
        self.bins = Some(Bins::PerInterval(bins));
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn accumulate(mut self, accumulate: bool) -> Self {
        self.accumulate = accumulate;
        self
    }

    pub fn preserve_total(mut self, preserve_total: bool) -> Self {
        self.preserve_total = preserve_total;
        self
    }

    pub fn ragged(mut self, ragged: bool) -> Self {
        self.ragged = ragged;
        self
    }

    pub fn processes(mut self, processes: usize) -> Self {
        self.processes = processes;
        self
    }

    /// The binning method in effect.
    pub fn effective_method(&self) -> Method {
        self.method.unwrap_or_default()
    }

    /// The options explicitly set to something other than their default.
    pub fn supplied(&self) -> Vec<OptionName> {
        let defaults = Options::default();
        let mut supplied = Vec::new();
        if self.stranded != defaults.stranded {
            supplied.push(OptionName::Stranded);
        }
        if self.shift_width != defaults.shift_width {
            supplied.push(OptionName::ShiftWidth);
        }
        if self.fragment_size.is_some() {
            supplied.push(OptionName::FragmentSize);
        }
        if self.read_strand.is_some() {
            supplied.push(OptionName::ReadStrand);
        }
        if self.use_score != defaults.use_score {
            supplied.push(OptionName::UseScore);
        }
        if self.bins.is_some() {
            supplied.push(OptionName::Bins);
        }
        if self.method.is_some() {
            supplied.push(OptionName::Method);
        }
        if self.accumulate != defaults.accumulate {
            supplied.push(OptionName::Accumulate);
        }
        if self.preserve_total != defaults.preserve_total {
            supplied.push(OptionName::PreserveTotal);
        }
        if self.ragged != defaults.ragged {
            supplied.push(OptionName::Ragged);
        }
        if self.processes != defaults.processes {
            supplied.push(OptionName::Processes);
        }
        supplied
    }
}

/// The name of each option, as used in error messages and configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OptionName {
    Stranded,
    ShiftWidth,
    FragmentSize,
    ReadStrand,
    UseScore,
    Bins,
    Method,
    Accumulate,
    PreserveTotal,
    Ragged,
    Processes,
}

impl OptionName {
    pub const ALL: [OptionName; 11] = [
        OptionName::Stranded,
        OptionName::ShiftWidth,
        OptionName::FragmentSize,
        OptionName::ReadStrand,
        OptionName::UseScore,
        OptionName::Bins,
        OptionName::Method,
        OptionName::Accumulate,
        OptionName::PreserveTotal,
        OptionName::Ragged,
        OptionName::Processes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OptionName::Stranded => "stranded",
            OptionName::ShiftWidth => "shift_width",
            OptionName::FragmentSize => "fragment_size",
            OptionName::ReadStrand => "read_strand",
            OptionName::UseScore => "use_score",
            OptionName::Bins => "bins",
            OptionName::Method => "method",
            OptionName::Accumulate => "accumulate",
            OptionName::PreserveTotal => "preserve_total",
            OptionName::Ragged => "ragged",
            OptionName::Processes => "processes",
        }
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
