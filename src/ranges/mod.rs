//! Intervals, strands, records and interval specifications.
//!
//! An [`Interval`] is the unit of every query: a sequence name, 0-indexed
//! right-exclusive coordinates, and an optional strand. It is usually built
//! from text such as `chr2L:1-20` or `chr2L:1-20[-]`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{error::GSignalError, traits::GenericRange, Position};

pub mod coitrees;
pub mod operations;

/// Nucleotide strand enum type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
    #[default]
    #[serde(rename = ".")]
    Unstranded,
}

impl Strand {
    pub fn symbol(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unstranded => '.',
        }
    }

    pub fn is_reverse(&self) -> bool {
        matches!(self, Strand::Reverse)
    }
}

impl FromStr for Strand {
    type Err = GSignalError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." => Ok(Strand::Unstranded),
            _ => Err(GSignalError::InvalidStrand(s.to_string())),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A genomic interval, 0-indexed and right-exclusive.
///
/// Intervals are immutable once built; [`Interval::new`] enforces `start <= end`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Interval {
    pub seqname: String,
    pub start: Position,
    pub end: Position,
    pub strand: Strand,
}

impl Interval {
    /// Create a new unstranded interval.
    pub fn new(seqname: &str, start: Position, end: Position) -> Result<Self, GSignalError> {
        if start > end {
            return Err(GSignalError::InvalidInterval(start, end));
        }
        Ok(Self {
            seqname: seqname.to_string(),
            start,
            end,
            strand: Strand::Unstranded,
        })
    }

    /// Return this interval on `strand`.
    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Widen the interval by `pad` on both sides, clamping the start at zero.
    pub fn padded(&self, pad: Position) -> Self {
        Self {
            seqname: self.seqname.clone(),
            start: self.start.saturating_sub(pad),
            end: self.end.saturating_add(pad),
            strand: self.strand,
        }
    }
}

impl GenericRange for Interval {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.end
    }
}

impl FromStr for Interval {
    type Err = GSignalError;

    /// Parse `chrom:start-end` or `chrom:start-end[strand]`, where strand is `+` or `-`.
    /// The sequence name is everything before the last `:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GSignalError::InvalidIntervalSpec(s.to_string());
        let (body, strand) = match s.strip_suffix(']') {
            Some(rest) => {
                let (body, symbol) = rest.rsplit_once('[').ok_or_else(invalid)?;
                let strand = match symbol {
                    "+" => Strand::Forward,
                    "-" => Strand::Reverse,
                    _ => return Err(GSignalError::InvalidStrand(symbol.to_string())),
                };
                (body, strand)
            }
            None => (s, Strand::Unstranded),
        };
        let (seqname, coords) = body.rsplit_once(':').ok_or_else(invalid)?;
        if seqname.is_empty() {
            return Err(invalid());
        }
        let (start, end) = coords.split_once('-').ok_or_else(invalid)?;
        let start: Position = start.trim().parse().map_err(|_| invalid())?;
        let end: Position = end.trim().parse().map_err(|_| invalid())?;
        Ok(Interval::new(seqname, start, end)?.with_strand(strand))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.seqname, self.start, self.end)?;
        match self.strand {
            Strand::Unstranded => Ok(()),
            strand => write!(f, "[{}]", strand),
        }
    }
}

/// A record returned by a source: the span of one read, feature or data block.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub start: Position,
    pub end: Position,
    pub strand: Strand,
    pub score: Option<f64>,
}

impl Record {
    pub fn new(start: Position, end: Position, strand: Strand, score: Option<f64>) -> Self {
        Self {
            start,
            end,
            strand,
            score,
        }
    }
}

impl GenericRange for Record {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.end
    }
}

/// One row of output: either a single interval, or an ordered list of
/// sub-intervals whose signals are concatenated in order.
#[derive(Clone, Debug, PartialEq)]
pub enum IntervalSpec {
    Single(Interval),
    Multi(Vec<Interval>),
}

impl IntervalSpec {
    /// The sub-intervals of this spec, in order.
    pub fn intervals(&self) -> &[Interval] {
        match self {
            IntervalSpec::Single(interval) => std::slice::from_ref(interval),
            IntervalSpec::Multi(intervals) => intervals,
        }
    }

    /// Parse a set of interval strings into a single row.
    pub fn parse_multi<S: AsRef<str>>(specs: &[S]) -> Result<Self, GSignalError> {
        let intervals = specs
            .iter()
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<Interval>, _>>()?;
        Ok(IntervalSpec::Multi(intervals))
    }
}

impl From<Interval> for IntervalSpec {
    fn from(interval: Interval) -> Self {
        IntervalSpec::Single(interval)
    }
}

impl From<Vec<Interval>> for IntervalSpec {
    fn from(intervals: Vec<Interval>) -> Self {
        IntervalSpec::Multi(intervals)
    }
}

impl FromStr for IntervalSpec {
    type Err = GSignalError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(IntervalSpec::Single(s.parse()?))
    }
}
