//! Native binned summaries of dense signal tracks.
//!
//! Both methods report, per bin, the mean over the *covered* bases of the bin
//! (bases with no data, or non-finite data, are ignored; a bin with no covered
//! bases is 0). They differ in where the bin edges fall:
//!
//!  - [`Method::UcscSummarize`]: integer-truncated edges, `start + i * L / N`,
//!    as the UCSC tools compute them. A bin narrower than a base is widened to one.
//!  - [`Method::Summarize`]: fractional edges rounded outward, so adjacent bins
//!    may share a base. This is also the method that may read reduced-resolution
//!    (zoom) data, so its values can differ from the per-base methods near the
//!    edges of covered regions.

use crate::{binning::Method, ranges::Interval, ranges::Record, Position};

/// A span of a dense track: the sum of values over the span, and the number of
/// covered bases in it.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryBlock {
    pub start: Position,
    pub end: Position,
    pub sum: f64,
    pub covered: f64,
}

impl SummaryBlock {
    /// A full-resolution block from a record whose score is its per-base value.
    /// Records without a finite score carry no data.
    pub fn from_record(record: &Record) -> Option<Self> {
        let value = record.score.filter(|v| v.is_finite())?;
        let width = f64::from(record.end - record.start);
        Some(Self {
            start: record.start,
            end: record.end,
            sum: value * width,
            covered: width,
        })
    }

    /// The share of this block's sum and coverage falling in `[lo, hi)`, assuming
    /// the data are spread evenly across the block.
    fn share(&self, lo: Position, hi: Position) -> Option<(f64, f64)> {
        let start = self.start.max(lo);
        let end = self.end.min(hi);
        if end <= start || self.end <= self.start {
            return None;
        }
        let fraction = f64::from(end - start) / f64::from(self.end - self.start);
        Some((self.sum * fraction, self.covered * fraction))
    }
}

/// Bin edges for `method` over `interval` with `n` bins.
pub fn bin_edges(interval: &Interval, n: usize, method: Method) -> Vec<(Position, Position)> {
    let start = u64::from(interval.start);
    let len = u64::from(interval.end - interval.start);
    let n64 = n as u64;
    (0..n64)
        .map(|i| {
            let (lo, hi) = match method {
                Method::Summarize => {
                    let width = len as f64 / n as f64;
                    let lo = (start as f64 + i as f64 * width).floor() as u64;
                    let hi = (start as f64 + (i + 1) as f64 * width).ceil() as u64;
                    (lo, hi)
                }
                _ => (start + i * len / n64, start + (i + 1) * len / n64),
            };
            let hi = hi.max(lo + 1);
            (
                Position::try_from(lo).unwrap_or(Position::MAX),
                Position::try_from(hi).unwrap_or(Position::MAX),
            )
        })
        .collect()
}

/// The covered-base mean of `blocks` in each bin of `interval`.
pub fn summarize_blocks(
    blocks: &[SummaryBlock],
    interval: &Interval,
    n: usize,
    method: Method,
) -> Vec<f64> {
    bin_edges(interval, n, method)
        .into_iter()
        .map(|(lo, hi)| {
            let (sum, covered) = blocks
                .iter()
                .filter_map(|block| block.share(lo, hi))
                .fold((0.0, 0.0), |(s, c), (bs, bc)| (s + bs, c + bc));
            if covered > 0.0 {
                sum / covered
            } else {
                0.0
            }
        })
        .collect()
}

/// Summarize full-resolution dense records.
pub fn summarize_records(
    records: &[Record],
    interval: &Interval,
    n: usize,
    method: Method,
) -> Vec<f64> {
    let blocks: Vec<SummaryBlock> = records.iter().filter_map(SummaryBlock::from_record).collect();
    summarize_blocks(&blocks, interval, n, method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranges::Strand;

    fn interval(start: Position, end: Position) -> Interval {
        Interval::new("chr1", start, end).unwrap()
    }

    #[test]
    fn test_ucsc_edges() {
        let edges = bin_edges(&interval(1, 20), 8, Method::UcscSummarize);
        assert_eq!(edges[0], (1, 3));
        assert_eq!(edges[3], (8, 10));
        assert_eq!(edges[7], (17, 20));
        // narrower than a base
        let edges = bin_edges(&interval(0, 2), 4, Method::UcscSummarize);
        assert_eq!(edges, vec![(0, 1), (0, 1), (1, 2), (1, 2)]);
    }

    #[test]
    fn test_summarize_edges_round_outward() {
        let edges = bin_edges(&interval(1, 20), 8, Method::Summarize);
        assert_eq!(edges[3], (8, 11));
        assert_eq!(edges[5], (12, 16));
    }

    #[test]
    fn test_covered_mean_ignores_gaps() {
        let records = vec![
            Record::new(0, 2, Strand::Unstranded, Some(4.0)),
            Record::new(6, 8, Strand::Unstranded, Some(f64::NAN)),
        ];
        let values = summarize_records(&records, &interval(0, 8), 2, Method::UcscSummarize);
        assert_eq!(values, vec![4.0, 0.0]);
    }

    #[test]
    fn test_weighted_by_overlap() {
        let records = vec![
            Record::new(0, 1, Strand::Unstranded, Some(1.0)),
            Record::new(1, 4, Strand::Unstranded, Some(5.0)),
        ];
        let values = summarize_records(&records, &interval(0, 4), 1, Method::UcscSummarize);
        assert_eq!(values, vec![4.0]);
    }

    #[test]
    fn test_zoom_block_share() {
        // a reduced-resolution block covering half its bases, summing to 10
        let block = SummaryBlock {
            start: 0,
            end: 10,
            sum: 10.0,
            covered: 5.0,
        };
        let values = summarize_blocks(&[block], &interval(0, 10), 2, Method::Summarize);
        assert_eq!(values, vec![2.0, 2.0]);
    }
}
