//! Parallel, order-preserving batch evaluation.
//!
//! Work items are split into contiguous chunks, one per worker. Each worker owns
//! its own [`SignalSource`] handle (from [`SignalSource::reopen`]), so no mutable
//! state is shared. Results are merged back by their original index, so row `i`
//! of the output always corresponds to input `i`, whatever the number of workers.

use log::{debug, info};
use ndarray::Array2;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::{
    binning::interval_signal,
    error::GSignalError,
    options::Options,
    ranges::IntervalSpec,
    traits::SignalSource,
};

pub use crate::binning::Signal;

/// The output of a batch: a rectangular table, or rows of varying lengths.
#[derive(Clone, Debug, PartialEq)]
pub enum BatchResult {
    Table(Array2<f64>),
    Ragged(Vec<Vec<f64>>),
}

impl BatchResult {
    pub fn nrows(&self) -> usize {
        match self {
            BatchResult::Table(table) => table.nrows(),
            BatchResult::Ragged(rows) => rows.len(),
        }
    }

    /// Row `i`, as a vector.
    pub fn row(&self, i: usize) -> Option<Vec<f64>> {
        match self {
            BatchResult::Table(table) => (i < table.nrows()).then(|| table.row(i).to_vec()),
            BatchResult::Ragged(rows) => rows.get(i).cloned(),
        }
    }

    /// All rows, as vectors.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        match self {
            BatchResult::Table(table) => table.outer_iter().map(|row| row.to_vec()).collect(),
            BatchResult::Ragged(rows) => rows.clone(),
        }
    }
}

/// Run `evaluate` over every item, with up to `processes` workers.
///
/// `evaluate` receives a worker's source handle, the item's original index and
/// the item. With a single worker (or a single item) everything runs on the
/// current thread against `source` itself.
pub fn dispatch<T, R, F>(
    source: &mut dyn SignalSource,
    items: &[T],
    processes: usize,
    evaluate: F,
) -> Result<Vec<R>, GSignalError>
where
    T: Sync,
    R: Send,
    F: Fn(&mut dyn SignalSource, usize, &T) -> Result<R, GSignalError> + Sync,
{
    let n = items.len();
    if processes <= 1 || n <= 1 {
        return items
            .iter()
            .enumerate()
            .map(|(index, item)| evaluate(source, index, item))
            .collect();
    }

    let chunk_size = n.div_ceil(processes);
    let nchunks = n.div_ceil(chunk_size);
    let handles = (0..nchunks)
        .map(|_| source.reopen())
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        "dispatching {} items to {} workers in chunks of {}",
        n, nchunks, chunk_size
    );

    let pool = ThreadPoolBuilder::new().num_threads(processes).build()?;
    let chunk_results: Vec<Result<Vec<(usize, R)>, GSignalError>> = pool.install(|| {
        handles
            .into_par_iter()
            .zip(items.par_chunks(chunk_size))
            .enumerate()
            .map(|(chunk_index, (mut handle, chunk))| {
                let offset = chunk_index * chunk_size;
                chunk
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let index = offset + i;
                        evaluate(handle.as_mut(), index, item).map(|result| (index, result))
                    })
                    .collect()
            })
            .collect()
    });

    // keyed merge back into input order
    let mut merged: Vec<Option<R>> = (0..n).map(|_| None).collect();
    for chunk in chunk_results {
        for (index, result) in chunk? {
            merged[index] = Some(result);
        }
    }
    merged
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            result.ok_or_else(|| {
                GSignalError::InvalidArgument(format!("no result for batch item {}", index))
            })
        })
        .collect()
}

/// Evaluate one output row: the in-order concatenation of each sub-interval's signal.
pub fn evaluate_spec(
    source: &mut dyn SignalSource,
    spec: &IntervalSpec,
    bins: Option<usize>,
    options: &Options,
) -> Result<Signal, GSignalError> {
    let signals = spec
        .intervals()
        .iter()
        .map(|interval| interval_signal(source, interval, bins, options))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Signal::concat(signals))
}

/// The length each row will have, known before any data is read.
pub fn expected_row_lengths(specs: &[IntervalSpec], options: &Options) -> Vec<usize> {
    let tracks = if options.stranded { 2 } else { 1 };
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let bins = options.bins.as_ref().and_then(|bins| bins.for_row(i));
            let width: usize = spec
                .intervals()
                .iter()
                .map(|interval| bins.unwrap_or_else(|| interval.len()))
                .sum();
            width * tracks
        })
        .collect()
}

/// Evaluate many specs against one source, one row per spec.
pub fn batch_array(
    source: &mut dyn SignalSource,
    specs: &[IntervalSpec],
    options: &Options,
) -> Result<BatchResult, GSignalError> {
    let lengths = expected_row_lengths(specs, options);
    if !options.ragged {
        if let Some((i, length)) = lengths
            .iter()
            .enumerate()
            .find(|(_, length)| **length != lengths[0])
        {
            return Err(GSignalError::InvalidArgument(format!(
                "row {} has {} values but row 0 has {}; use ragged output or set bins",
                i, length, lengths[0]
            )));
        }
    }
    info!(
        "evaluating {} rows from {} source with {} processes",
        specs.len(),
        source.kind(),
        options.processes
    );

    let rows = dispatch(source, specs, options.processes, |handle, index, spec| {
        let bins = options.bins.as_ref().and_then(|bins| bins.for_row(index));
        let mut signal = evaluate_spec(handle, spec, bins, options)?;
        if options.preserve_total {
            signal.normalize();
        }
        Ok(signal.row())
    })?;

    if options.ragged {
        return Ok(BatchResult::Ragged(rows));
    }
    let width = lengths.first().copied().unwrap_or(0);
    let nrows = rows.len();
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Ok(BatchResult::Table(Array2::from_shape_vec((nrows, width), flat)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::{gdc_source, parse, random_specs};

    fn specs(texts: &[&str]) -> Vec<IntervalSpec> {
        texts.iter().map(|t| parse(t).into()).collect()
    }

    #[test]
    fn test_array_mean_bins() {
        let mut source = gdc_source();
        let result = batch_array(
            &mut source,
            &specs(&["chr2L:1-20", "chr2L:1-20[-]"]),
            &Options::default().bins(8),
        )
        .unwrap();
        assert_eq!(
            result.rows(),
            vec![
                vec![0., 0., 0., 0., 1., 1., 0., 0.],
                vec![0., 0., 1., 1., 0., 0., 0., 0.]
            ]
        );
    }

    #[test]
    fn test_preserve_total() {
        let mut source = gdc_source();
        let result = batch_array(
            &mut source,
            &specs(&["chr2L:1-20", "chr2L:68-76", "chr2L:1000-1008"]),
            &Options::default().bins(8).preserve_total(true),
        )
        .unwrap();
        let rows = result.rows();
        assert_eq!(rows[0], vec![0., 0., 0., 0., 0.5, 0.5, 0., 0.]);
        assert_eq!(rows[1], vec![0., 0., 0.2, 0.2, 0.2, 0.2, 0.2, 0.]);
        assert_eq!(rows[2], vec![0.; 8]);
    }

    #[test]
    fn test_ragged_rows() {
        let mut source = gdc_source();
        let specs = vec![
            IntervalSpec::Multi(vec![parse("chr2L:68-76"), parse("chr2L:68-76")]),
            parse("chr2L:68-76").into(),
        ];
        let result = batch_array(&mut source, &specs, &Options::default().ragged(true)).unwrap();
        let rows = result.rows();
        assert_eq!(rows[0].len(), 16);
        assert_eq!(rows[1].len(), 8);
        assert_eq!(rows[0][..8], rows[1][..]);
        assert_eq!(rows[0][8..], rows[1][..]);
    }

    #[test]
    fn test_unequal_rows_rejected_before_reading() {
        let mut source = gdc_source();
        let result = batch_array(
            &mut source,
            &specs(&["chr2L:1-20", "chr2L:1-30"]),
            &Options::default(),
        );
        assert!(matches!(result, Err(GSignalError::InvalidArgument(_))));
    }

    #[test]
    fn test_stranded_rows_double() {
        let mut source = gdc_source();
        let result = batch_array(
            &mut source,
            &specs(&["chr2L:148-165"]),
            &Options::default().stranded(true).bins(4),
        )
        .unwrap();
        assert_eq!(result.row(0).unwrap().len(), 8);
        assert_eq!(expected_row_lengths(&specs(&["chr2L:148-165"]), &Options::default().stranded(true)), vec![34]);
    }

    #[test]
    fn test_per_interval_bins() {
        let mut source = gdc_source();
        let result = batch_array(
            &mut source,
            &specs(&["chr2L:1-20", "chr2L:60-90"]),
            &Options::default().bins_per_interval(vec![4, 6]).ragged(true),
        )
        .unwrap();
        assert_eq!(result.row(0).unwrap().len(), 4);
        assert_eq!(result.row(1).unwrap().len(), 6);
    }

    #[test]
    fn test_processes_do_not_change_results() {
        let specs = random_specs(200, "chr2L", 250, 40);
        let options = Options::default().bins(10).fragment_size(8);
        let mut source = gdc_source();
        let serial = batch_array(&mut source, &specs, &options).unwrap();
        for processes in [2, 3, 8] {
            let parallel =
                batch_array(&mut source, &specs, &options.clone().processes(processes)).unwrap();
            assert_eq!(serial, parallel, "processes = {}", processes);
        }
    }

    #[test]
    fn test_dispatch_preserves_order() {
        let mut source = gdc_source();
        let items: Vec<usize> = (0..37).collect();
        let out = dispatch(&mut source, &items, 4, |_, index, item| Ok((index, *item))).unwrap();
        assert!(out.iter().all(|(index, item)| index == item));
        assert_eq!(out.len(), 37);
    }

    #[test]
    fn test_empty_batch() {
        let mut source = gdc_source();
        let result = batch_array(&mut source, &[], &Options::default()).unwrap();
        assert_eq!(result.nrows(), 0);
    }
}
