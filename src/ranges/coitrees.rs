//! An in-memory record index built on [`coitrees::BasicCOITree`] interval trees, one per
//! sequence, kept in a [`GenomeMap`].

use coitrees::{BasicCOITree, GenericInterval, Interval as TreeInterval, IntervalTree};
use genomap::GenomeMap;
use indexmap::IndexMap;

use crate::{
    error::GSignalError,
    ranges::{Interval, Record},
    Position,
};

/// Convert a position to the `i32` coordinates `coitrees` uses.
fn tree_coordinate(position: Position) -> Result<i32, GSignalError> {
    position.try_into().map_err(|_| {
        GSignalError::InvalidRecord(format!(
            "position {} exceeds the interval tree coordinate range",
            position
        ))
    })
}

/// The records of a single sequence, with an interval tree whose metadata indexes
/// into `records`.
pub struct SequenceRecords {
    tree: BasicCOITree<usize, usize>,
    records: Vec<Record>,
}

impl std::fmt::Debug for SequenceRecords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceRecords")
            .field("number of records:", &self.records.len())
            .finish()
    }
}

impl SequenceRecords {
    fn new(records: Vec<Record>) -> Result<Self, GSignalError> {
        let mut intervals = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            // internally coitrees uses 0-indexed, right-inclusive "last"
            let first = tree_coordinate(record.start)?;
            let last = tree_coordinate(record.end)? - 1;
            intervals.push(TreeInterval::new(first, last, index));
        }
        let tree = BasicCOITree::new(&intervals);
        Ok(Self { tree, records })
    }

    /// Call `visit` on every record overlapping `[start, end)`.
    pub fn query<F>(&self, start: Position, end: Position, mut visit: F)
    where
        F: FnMut(&Record),
    {
        if start >= end {
            return;
        }
        let first = i32::try_from(start).unwrap_or(i32::MAX);
        let last = i32::try_from(end - 1).unwrap_or(i32::MAX);
        self.tree
            .query(first, last, |node| visit(&self.records[*node.metadata()]))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A per-sequence index of [`Record`]s supporting half-open overlap queries.
///
/// Zero-width records are dropped at construction, since they can never overlap a
/// half-open query.
pub struct RecordIndex {
    sequences: GenomeMap<SequenceRecords>,
    len: usize,
}

impl std::fmt::Debug for RecordIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordIndex")
            .field("number of records:", &self.len)
            .field("seqnames", &self.seqnames())
            .finish()
    }
}

impl RecordIndex {
    /// Build an index from `(seqname, record)` pairs, in any order.
    pub fn from_records<I>(records: I) -> Result<Self, GSignalError>
    where
        I: IntoIterator<Item = (String, Record)>,
    {
        let mut grouped: IndexMap<String, Vec<Record>> = IndexMap::new();
        for (seqname, record) in records {
            if record.start > record.end {
                return Err(GSignalError::InvalidInterval(record.start, record.end));
            }
            if record.start == record.end {
                continue;
            }
            grouped.entry(seqname).or_default().push(record);
        }

        let mut sequences = GenomeMap::new();
        let mut len = 0;
        for (seqname, records) in grouped {
            len += records.len();
            sequences.insert(&seqname, SequenceRecords::new(records)?)?;
        }
        Ok(Self { sequences, len })
    }

    /// The records overlapping `interval`; unknown sequences yield no records.
    pub fn overlapping(&self, interval: &Interval) -> Vec<Record> {
        let mut hits = Vec::new();
        if let Some(records) = self.sequences.get(&interval.seqname) {
            records.query(interval.start, interval.end, |record| {
                hits.push(record.clone())
            });
        }
        hits
    }

    /// The total number of indexed records.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn seqnames(&self) -> Vec<String> {
        self.sequences.names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranges::Strand;

    fn index() -> RecordIndex {
        let records = vec![
            ("chr1".to_string(), Record::new(0, 5, Strand::Forward, None)),
            ("chr1".to_string(), Record::new(4, 7, Strand::Reverse, None)),
            ("chr1".to_string(), Record::new(10, 17, Strand::Forward, Some(3.0))),
            ("chr1".to_string(), Record::new(12, 12, Strand::Forward, None)),
            ("chr2".to_string(), Record::new(1, 2, Strand::Unstranded, None)),
        ];
        RecordIndex::from_records(records).unwrap()
    }

    #[test]
    fn test_index_len_drops_zero_width() {
        let index = index();
        assert_eq!(index.len(), 4);
        assert_eq!(index.seqnames(), vec!["chr1".to_string(), "chr2".to_string()]);
    }

    #[test]
    fn test_half_open_overlaps() {
        let index = index();
        let hits = index.overlapping(&Interval::new("chr1", 5, 10).unwrap());
        assert_eq!(hits, vec![Record::new(4, 7, Strand::Reverse, None)]);

        // end is exclusive
        let hits = index.overlapping(&Interval::new("chr1", 7, 10).unwrap());
        assert!(hits.is_empty());

        let mut hits = index.overlapping(&Interval::new("chr1", 0, 20).unwrap());
        hits.sort_by_key(|r| r.start);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[2].score, Some(3.0));
    }

    #[test]
    fn test_empty_and_unknown_queries() {
        let index = index();
        assert!(index
            .overlapping(&Interval::new("chr1", 3, 3).unwrap())
            .is_empty());
        assert!(index
            .overlapping(&Interval::new("chrZ", 0, 100).unwrap())
            .is_empty());
    }

    #[test]
    fn test_invalid_record() {
        let records = vec![("chr1".to_string(), Record::new(5, 4, Strand::Forward, None))];
        assert!(RecordIndex::from_records(records).is_err());
    }
}
