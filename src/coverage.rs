//! Per-base coverage profiles.
//!
//! A [`Profile`] holds one value per base of a query interval, built from the
//! records a [`SignalSource`] returns. Records are adjusted (fragment extension,
//! shifting; see [`crate::ranges::operations`]), clipped to the interval, and then
//! contribute a weight to every base they cover.

use log::trace;

use crate::{
    error::GSignalError,
    options::Options,
    ranges::{operations::effective_span, Interval, Record, Strand},
    traits::SignalSource,
    Position,
};

/// Dense per-base values over `[start, start + values.len())`, in increasing
/// coordinate order. `minus` is present for stranded profiles, in which case
/// `values` holds the plus strand.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub start: Position,
    pub values: Vec<f64>,
    pub minus: Option<Vec<f64>>,
}

impl Profile {
    /// An all-zero profile over `interval`.
    pub fn zeros(interval: &Interval, stranded: bool) -> Self {
        let n = interval.len();
        Self {
            start: interval.start,
            values: vec![0.0; n],
            minus: stranded.then(|| vec![0.0; n]),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn end(&self) -> Position {
        self.start + self.values.len() as Position
    }
}

/// The padding needed around a query so that every record that could reach it after
/// fragment extension and shifting is fetched.
fn query_padding(options: &Options) -> Position {
    let shift = Position::try_from(options.shift_width.unsigned_abs()).unwrap_or(Position::MAX);
    options.fragment_size.unwrap_or(0).saturating_add(shift)
}

/// The weight a record contributes to each base it covers.
fn record_weight(record: &Record, options: &Options, dense: bool) -> Result<f64, GSignalError> {
    if dense {
        // dense tracks are weighted by their value; gaps and NaNs are zero
        return Ok(record.score.filter(|v| v.is_finite()).unwrap_or(0.0));
    }
    if options.use_score {
        return record.score.ok_or(GSignalError::MissingScore);
    }
    Ok(1.0)
}

/// Add `weight` over `track[offset..offset + len]`, or without `accumulate` keep the
/// largest weight seen per base. `written` marks bases some record has already set,
/// so a lone negative weight is kept rather than losing to the initial zero.
fn deposit(
    track: &mut [f64],
    written: &mut [bool],
    offset: usize,
    len: usize,
    weight: f64,
    accumulate: bool,
) {
    let range = offset..offset + len;
    for (value, seen) in track[range.clone()].iter_mut().zip(&mut written[range]) {
        if accumulate {
            *value += weight;
        } else if *seen {
            *value = value.max(weight);
        } else {
            *value = weight;
        }
        *seen = true;
    }
}

/// Build a profile over `interval` from a set of `records` (which may extend past it).
pub fn profile_from_records(
    records: &[Record],
    interval: &Interval,
    options: &Options,
    dense: bool,
) -> Result<Profile, GSignalError> {
    let mut profile = Profile::zeros(interval, options.stranded);
    if interval.is_empty() {
        return Ok(profile);
    }
    let mut written_plus = vec![false; profile.len()];
    let mut written_minus = vec![false; profile.len()];

    for record in records {
        if let Some(strand) = options.read_strand {
            if record.strand != strand {
                continue;
            }
        }
        let Some((start, end)) = effective_span(
            record,
            options.shift_width,
            options.fragment_size,
            interval.start,
            interval.end,
        ) else {
            continue;
        };
        let weight = record_weight(record, options, dense)?;

        let (track, written) = if options.stranded {
            match record.strand {
                Strand::Forward => (&mut profile.values, &mut written_plus),
                Strand::Reverse => match profile.minus.as_mut() {
                    Some(minus) => (minus, &mut written_minus),
                    None => continue,
                },
                Strand::Unstranded => continue,
            }
        } else {
            (&mut profile.values, &mut written_plus)
        };
        let offset = (start - interval.start) as usize;
        deposit(
            track,
            written,
            offset,
            (end - start) as usize,
            weight,
            options.accumulate,
        );
    }
    Ok(profile)
}

/// Build the coverage profile of `interval` from `source`.
pub fn build_profile(
    source: &mut dyn SignalSource,
    interval: &Interval,
    options: &Options,
) -> Result<Profile, GSignalError> {
    if interval.is_empty() {
        return Ok(Profile::zeros(interval, options.stranded));
    }
    let query = interval.padded(query_padding(options));
    let records = source.overlapping_records(&query)?;
    trace!("{} records overlap {}", records.len(), query);
    let dense = source.capabilities().dense;
    profile_from_records(&records, interval, options, dense)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::{gdc_dense_source, gdc_source, parse};

    fn coverage(interval: &str, options: Options) -> Vec<f64> {
        let mut source = gdc_source();
        build_profile(&mut source, &parse(interval), &options)
            .unwrap()
            .values
    }

    #[test]
    fn test_default_coverage() {
        assert_eq!(
            coverage("chr2L:68-76", Options::default()),
            vec![0., 0., 2., 2., 2., 2., 2., 0.]
        );
    }

    #[test]
    fn test_no_records_is_zero() {
        assert_eq!(coverage("chr2L:1000-1010", Options::default()), vec![0.; 10]);
        assert_eq!(coverage("chrZ:0-4", Options::default()), vec![0.; 4]);
        assert!(coverage("chr2L:70-70", Options::default()).is_empty());
    }

    #[test]
    fn test_shift() {
        assert_eq!(
            coverage("chr2L:68-76", Options::default().shift_width(1)),
            vec![0., 1., 1., 2., 2., 2., 1., 1.]
        );
        assert_eq!(
            coverage("chr2L:68-76", Options::default().shift_width(10)),
            vec![0.; 8]
        );
        let expected: Vec<f64> = (1..20)
            .map(|b| if (8..13).contains(&b) { 1. } else { 0. })
            .collect();
        assert_eq!(
            coverage("chr2L:1-20", Options::default().shift_width(-2)),
            expected
        );
    }

    #[test]
    fn test_fragment_size() {
        assert_eq!(
            coverage("chr2L:68-76", Options::default().fragment_size(6)),
            vec![0., 1., 2., 2., 2., 2., 2., 1.]
        );
        assert_eq!(
            coverage("chr2L:68-76", Options::default().fragment_size(1)),
            vec![0., 0., 1., 0., 0., 0., 1., 0.]
        );
        let expected: Vec<f64> = (1..20)
            .map(|b| if (10..17).contains(&b) { 1. } else { 0. })
            .collect();
        assert_eq!(
            coverage("chr2L:1-20", Options::default().fragment_size(7)),
            expected
        );
    }

    #[test]
    fn test_read_strand() {
        assert_eq!(
            coverage("chr2L:1-20", Options::default().read_strand(Strand::Reverse)),
            vec![0.; 19]
        );
        assert_eq!(
            coverage("chr2L:68-76", Options::default().read_strand(Strand::Reverse)),
            vec![0., 0., 1., 1., 1., 1., 1., 0.]
        );
    }

    #[test]
    fn test_use_score() {
        assert_eq!(
            coverage("chr2L:68-76", Options::default().use_score(true)),
            vec![0., 0., 510., 510., 510., 510., 510., 0.]
        );
    }

    #[test]
    fn test_missing_score() {
        let records = vec![Record::new(0, 5, Strand::Forward, None)];
        let interval = parse("chr1:0-5");
        let result = profile_from_records(&records, &interval, &Options::default().use_score(true), false);
        assert!(matches!(result, Err(GSignalError::MissingScore)));
    }

    #[test]
    fn test_accumulate_false_does_not_sum() {
        assert_eq!(
            coverage("chr2L:68-76", Options::default().accumulate(false)),
            vec![0., 0., 1., 1., 1., 1., 1., 0.]
        );
    }

    #[test]
    fn test_accumulate_false_keeps_negative_weights() {
        let interval = parse("chr1:0-6");
        let dense = vec![
            Record::new(0, 4, Strand::Unstranded, Some(-3.0)),
            Record::new(2, 4, Strand::Unstranded, Some(-5.0)),
        ];
        let profile =
            profile_from_records(&dense, &interval, &Options::default().accumulate(false), true)
                .unwrap();
        assert_eq!(profile.values, vec![-3., -3., -3., -3., 0., 0.]);

        let reads = vec![
            Record::new(0, 4, Strand::Forward, Some(-2.0)),
            Record::new(1, 3, Strand::Reverse, Some(-1.0)),
        ];
        let options = Options::default().use_score(true).accumulate(false);
        let profile = profile_from_records(&reads, &interval, &options, false).unwrap();
        assert_eq!(profile.values, vec![-2., -1., -1., -2., 0., 0.]);

        let stranded = profile_from_records(&reads, &interval, &options.stranded(true), false)
            .unwrap();
        assert_eq!(stranded.values, vec![-2., -2., -2., -2., 0., 0.]);
        assert_eq!(stranded.minus, Some(vec![0., -1., -1., 0., 0., 0.]));
    }

    #[test]
    fn test_stranded_tracks() {
        let mut source = gdc_source();
        let profile = build_profile(
            &mut source,
            &parse("chr2L:148-165"),
            &Options::default().stranded(true),
        )
        .unwrap();
        let plus: f64 = profile.values.iter().sum();
        let minus: f64 = profile.minus.unwrap().iter().sum();
        assert_eq!((plus, minus), (5., 5.));
        assert_eq!(profile.values[2], 1.);
        assert_eq!(profile.values[10], 0.);
    }

    #[test]
    fn test_dense_profile_matches_reads() {
        let mut dense = gdc_dense_source();
        let interval = parse("chr2L:0-210");
        let from_dense = build_profile(&mut dense, &interval, &Options::default()).unwrap();
        let from_reads = coverage("chr2L:0-210", Options::default());
        assert_eq!(from_dense.values, from_reads);
    }

    #[test]
    fn test_dense_non_finite_is_zero() {
        let records = vec![
            Record::new(0, 2, Strand::Unstranded, Some(f64::NAN)),
            Record::new(2, 4, Strand::Unstranded, Some(3.0)),
        ];
        let profile =
            profile_from_records(&records, &parse("chr1:0-4"), &Options::default(), true).unwrap();
        assert_eq!(profile.values, vec![0., 0., 3., 3.]);
    }

    #[test]
    fn test_superposition() {
        let interval = parse("chr1:0-20");
        let a = vec![Record::new(2, 9, Strand::Forward, None)];
        let b = vec![
            Record::new(5, 14, Strand::Reverse, None),
            Record::new(0, 3, Strand::Forward, None),
        ];
        let both: Vec<Record> = a.iter().chain(b.iter()).cloned().collect();
        let options = Options::default().shift_width(2).fragment_size(6);
        let pa = profile_from_records(&a, &interval, &options, false).unwrap();
        let pb = profile_from_records(&b, &interval, &options, false).unwrap();
        let pboth = profile_from_records(&both, &interval, &options, false).unwrap();
        let summed: Vec<f64> = pa.values.iter().zip(&pb.values).map(|(x, y)| x + y).collect();
        assert_eq!(pboth.values, summed);
    }
}
