//! Reduction of per-base profiles into bins, and evaluation of one interval into a
//! [`Signal`].
//!
//! # Methods
//!
//! With `N` bins over an interval of `L` bases starting at `start`:
//!
//!  - [`Method::Mean`]: `N` equal windows; each value is the mean of the bases
//!    whose centers fall in the window, and each coordinate is the window center,
//!    `start + (i + 0.5) L / N - 0.5`. A window containing no base center takes
//!    the value of the base under its center.
//!  - [`Method::Interpolate`]: coordinates `linspace(start, end - 1, N)`, values
//!    linearly interpolated between bases.
//!  - [`Method::BinCovered`] and [`Method::MeanOffsetCoverage`]: coordinates are
//!    `linspace(start, end - 1, N)` rounded to whole bases, or the `Mean` window
//!    centers when `N > L`, and each base belongs to its nearest coordinate (ties
//!    go right). The value is 1.0 if any base in the bin is nonzero, or the mean
//!    of the bin's bases, respectively. A bin holding no base takes the value of
//!    the base under its coordinate.
//!  - [`Method::Summarize`] and [`Method::UcscSummarize`]: computed by the source
//!    itself; see [`crate::sources::summary`].
//!
//! Minus-strand intervals are oriented as a final step, by reversing coordinates
//! and values.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{
    coverage::{build_profile, Profile},
    error::GSignalError,
    options::Options,
    ranges::Interval,
    traits::SignalSource,
};

/// How to reduce a profile into bins.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Method {
    /// Mean of each of `N` equal windows.
    #[default]
    Mean,
    /// 1.0 if any base in the bin has signal.
    BinCovered,
    /// Mean of the bin's bases.
    MeanOffsetCoverage,
    /// Linear interpolation of the profile at `N` evenly spaced positions.
    #[serde(alias = "get_as_array")]
    #[value(alias = "get_as_array")]
    Interpolate,
    /// Format-native summary, possibly from reduced-resolution data.
    Summarize,
    /// Format-native summary at full resolution, with UCSC-style bin edges.
    UcscSummarize,
}

impl Method {
    pub fn name(&self) -> &'static str {
        match self {
            Method::Mean => "mean",
            Method::BinCovered => "bin_covered",
            Method::MeanOffsetCoverage => "mean_offset_coverage",
            Method::Interpolate => "interpolate",
            Method::Summarize => "summarize",
            Method::UcscSummarize => "ucsc_summarize",
        }
    }

    /// Whether this method is computed by the source rather than from a profile.
    pub fn is_native(&self) -> bool {
        matches!(self, Method::Summarize | Method::UcscSummarize)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Method {
    type Err = GSignalError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Method as ValueEnum>::from_str(s, true)
            .map_err(|_| GSignalError::InvalidArgument(format!("unknown method '{}'", s)))
    }
}

/// Coordinates and values of one evaluated interval (or a concatenation of several).
/// `minus` is present only for stranded coverage.
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub minus: Option<Vec<f64>>,
}

impl Signal {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Reverse coordinates and values, for minus-strand intervals.
    pub fn reverse(&mut self) {
        self.x.reverse();
        self.y.reverse();
        if let Some(minus) = self.minus.as_mut() {
            minus.reverse();
        }
    }

    /// Concatenate signals in order.
    pub fn concat(signals: Vec<Signal>) -> Signal {
        let stranded = signals.iter().any(|s| s.minus.is_some());
        let mut out = Signal {
            x: Vec::new(),
            y: Vec::new(),
            minus: stranded.then(Vec::new),
        };
        for signal in signals {
            out.x.extend(signal.x);
            out.y.extend(signal.y);
            if let Some(minus) = out.minus.as_mut() {
                minus.extend(signal.minus.unwrap_or_default());
            }
        }
        out
    }

    /// The output row: values, followed by minus-strand values when present.
    pub fn row(&self) -> Vec<f64> {
        let mut row = self.y.clone();
        if let Some(minus) = &self.minus {
            row.extend_from_slice(minus);
        }
        row
    }

    /// Divide values by their total (over both strands); all-zero signals are unchanged.
    pub fn normalize(&mut self) {
        let total: f64 =
            self.y.iter().sum::<f64>() + self.minus.iter().flatten().sum::<f64>();
        if total == 0.0 {
            return;
        }
        self.y.iter_mut().for_each(|v| *v /= total);
        if let Some(minus) = self.minus.as_mut() {
            minus.iter_mut().for_each(|v| *v /= total);
        }
    }
}

/// `n` evenly spaced values over `[first, last]`, inclusive.
pub fn linspace(first: f64, last: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![first],
        _ => {
            let step = (last - first) / (n - 1) as f64;
            (0..n).map(|i| first + step * i as f64).collect()
        }
    }
}

/// Bin coordinates for a per-base `method`, over an interval starting at `start`
/// with `len` bases.
pub fn bin_coordinates(method: Method, start: f64, len: usize, n: usize) -> Vec<f64> {
    if len == 0 {
        return vec![start; n];
    }
    let last = start + (len - 1) as f64;
    match method {
        Method::Mean => window_centers(start, len, n),
        // rounding would repeat coordinates once bins outnumber bases
        Method::BinCovered | Method::MeanOffsetCoverage if n > len => {
            window_centers(start, len, n)
        }
        Method::BinCovered | Method::MeanOffsetCoverage => linspace(start, last, n)
            .into_iter()
            .map(f64::round)
            .collect(),
        Method::Interpolate | Method::Summarize | Method::UcscSummarize => {
            linspace(start, last, n)
        }
    }
}

/// Centers of `n` equal windows over `len` bases starting at `start`.
fn window_centers(start: f64, len: usize, n: usize) -> Vec<f64> {
    let width = len as f64 / n as f64;
    (0..n)
        .map(|i| start + (i as f64 + 0.5) * width - 0.5)
        .collect()
}

fn window_means(values: &[f64], n: usize) -> Vec<f64> {
    let len = values.len();
    if n == 0 || len == 0 {
        return vec![0.0; n];
    }
    let mut sums = vec![0.0; n];
    let mut counts = vec![0usize; n];
    for (j, value) in values.iter().enumerate() {
        // the window containing this base's center
        let window = ((2 * j + 1) * n / (2 * len)).min(n - 1);
        sums[window] += value;
        counts[window] += 1;
    }
    (0..n)
        .map(|i| {
            if counts[i] > 0 {
                sums[i] / counts[i] as f64
            } else {
                let center = ((2 * i + 1) * len / (2 * n)).min(len - 1);
                values[center]
            }
        })
        .collect()
}

fn interpolate(values: &[f64], positions: &[f64]) -> Vec<f64> {
    let last = values.len() - 1;
    positions
        .iter()
        .map(|&p| {
            let p = p.clamp(0.0, last as f64);
            let lo = p.floor() as usize;
            let hi = (lo + 1).min(last);
            let frac = p - lo as f64;
            values[lo] * (1.0 - frac) + values[hi] * frac
        })
        .collect()
}

/// Nearest-center bins: base offset `b` moves on to bin `i + 1` once
/// `2b >= c_i + c_{i+1}`.
fn offset_bins(values: &[f64], centers: &[f64], covered: bool) -> Vec<f64> {
    let n = centers.len();
    let mut sums = vec![0.0; n];
    let mut counts = vec![0usize; n];
    let mut any = vec![false; n];
    let mut bin = 0;
    for (b, value) in values.iter().enumerate() {
        while bin + 1 < n && 2.0 * b as f64 >= centers[bin] + centers[bin + 1] {
            bin += 1;
        }
        sums[bin] += value;
        counts[bin] += 1;
        any[bin] |= *value != 0.0;
    }
    let last = values.len() - 1;
    (0..n)
        .map(|i| {
            if counts[i] == 0 {
                let value = values[((centers[i] + 0.5).floor().max(0.0) as usize).min(last)];
                return if covered {
                    f64::from(u8::from(value != 0.0))
                } else {
                    value
                };
            }
            if covered {
                f64::from(u8::from(any[i]))
            } else {
                sums[i] / counts[i] as f64
            }
        })
        .collect()
}

/// Reduce one track of per-base `values` into `n` bins.
pub fn bin_values(values: &[f64], n: usize, method: Method) -> Vec<f64> {
    if n == 0 || values.is_empty() {
        return vec![0.0; n];
    }
    match method {
        Method::Mean => window_means(values, n),
        Method::Interpolate => interpolate(values, &linspace(0.0, (values.len() - 1) as f64, n)),
        Method::BinCovered | Method::MeanOffsetCoverage => {
            let centers = bin_coordinates(method, 0.0, values.len(), n);
            offset_bins(values, &centers, method == Method::BinCovered)
        }
        // native methods never reach a profile; fall back to window means
        Method::Summarize | Method::UcscSummarize => window_means(values, n),
    }
}

/// Bin a profile. With `bins` of `None` the profile is returned per base.
pub fn bin_profile(profile: &Profile, bins: Option<usize>, method: Method) -> Signal {
    let start = f64::from(profile.start);
    match bins {
        None => Signal {
            x: (0..profile.len()).map(|i| start + i as f64).collect(),
            y: profile.values.clone(),
            minus: profile.minus.clone(),
        },
        Some(n) => Signal {
            x: bin_coordinates(method, start, profile.len(), n),
            y: bin_values(&profile.values, n, method),
            minus: profile
                .minus
                .as_ref()
                .map(|minus| bin_values(minus, n, method)),
        },
    }
}

/// Evaluate a single interval against `source` into a [`Signal`] of `bins` values
/// (one per base if `None`), oriented by the interval's strand.
pub fn interval_signal(
    source: &mut dyn SignalSource,
    interval: &Interval,
    bins: Option<usize>,
    options: &Options,
) -> Result<Signal, GSignalError> {
    let method = options.effective_method();
    let mut signal = if method.is_native() {
        let n = bins.unwrap_or_else(|| interval.len());
        let start = f64::from(interval.start);
        let y = if interval.is_empty() {
            vec![0.0; n]
        } else {
            source.native_binned_summary(interval, n, method)?
        };
        Signal {
            x: bin_coordinates(method, start, interval.len(), n),
            y,
            minus: None,
        }
    } else {
        let profile = build_profile(source, interval, options)?;
        bin_profile(&profile, bins, method)
    };
    if interval.strand.is_reverse() {
        signal.reverse();
    }
    Ok(signal)
}
