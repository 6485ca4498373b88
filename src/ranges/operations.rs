//! Record geometry operations.
//!
//! - [`adjust()`]: fragment extension and strand-aware shifting of a record.
//! - [`effective_span()`]: [`adjust()`] followed by clipping to the query interval.

use crate::{ranges::Record, ranges::Strand, Position, PositionOffset};

/// Extend a record to `fragment_size` from its 5' end (rightward from the start for
/// plus and unstranded records, leftward from the end for minus records), then
/// move it `shift` bases downstream (`+shift` for plus and unstranded records,
/// `-shift` for minus records).
///
/// The result is in signed coordinates, since shifting may move a record past
/// the start of the sequence.
pub fn adjust(
    record: &Record,
    shift: PositionOffset,
    fragment_size: Option<Position>,
) -> (PositionOffset, PositionOffset) {
    let mut start = PositionOffset::from(record.start);
    let mut end = PositionOffset::from(record.end);

    if let Some(fragment_size) = fragment_size {
        let fragment_size = PositionOffset::from(fragment_size);
        match record.strand {
            Strand::Reverse => start = end - fragment_size,
            Strand::Forward | Strand::Unstranded => end = start + fragment_size,
        }
    }

    let delta = match record.strand {
        Strand::Reverse => -shift,
        Strand::Forward | Strand::Unstranded => shift,
    };
    (start + delta, end + delta)
}

/// Adjust a record and clip it to `[start, end)`, returning `None` if the
/// adjusted record has zero width within the window.
pub fn effective_span(
    record: &Record,
    shift: PositionOffset,
    fragment_size: Option<Position>,
    start: Position,
    end: Position,
) -> Option<(Position, Position)> {
    let (adjusted_start, adjusted_end) = adjust(record, shift, fragment_size);
    let clipped_start = adjusted_start.max(PositionOffset::from(start));
    let clipped_end = adjusted_end.min(PositionOffset::from(end));
    if clipped_end <= clipped_start {
        return None;
    }
    // both ends now lie within [start, end], so the conversions cannot fail
    let clipped_start = Position::try_from(clipped_start).ok()?;
    let clipped_end = Position::try_from(clipped_end).ok()?;
    Some((clipped_start, clipped_end))
}
