//! Test cases and test utility functions.
//!
//! The "gdc" dataset is a handful of 5bp reads on `chr2L`, laid out so that
//! shifts, fragment extension and strand handling all have visible effects in
//! small windows:
//!
//! ```text
//! [10,15)+   [70,75)+ [70,75)-   [141,146)+ [141,146)-   [150,155)+   [158,163)-   [200,205)+
//! ```
//!
//! Every read has score 255. The same data are in `tests_data/gdc.*` as BED,
//! GFF, GTF and gzipped BED.

use flate2::write::GzEncoder;
use flate2::Compression;
use rand::{thread_rng, Rng};
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

use crate::{
    ranges::{Interval, IntervalSpec, Record, Strand},
    sources::{memory::InMemorySource, SourceKind},
    Position,
};

pub const GDC_SEQNAME: &str = "chr2L";
pub const GDC_SCORE: f64 = 255.0;

/// The gdc reads as `(start, end, strand)`.
pub const GDC_READS: [(Position, Position, Strand); 8] = [
    (10, 15, Strand::Forward),
    (70, 75, Strand::Forward),
    (70, 75, Strand::Reverse),
    (141, 146, Strand::Forward),
    (141, 146, Strand::Reverse),
    (150, 155, Strand::Forward),
    (158, 163, Strand::Reverse),
    (200, 205, Strand::Forward),
];

/// The dense coverage track of the gdc reads, as `(start, end, value)` blocks.
pub const GDC_COVERAGE: [(Position, Position, f64); 6] = [
    (10, 15, 1.0),
    (70, 75, 2.0),
    (141, 146, 2.0),
    (150, 155, 1.0),
    (158, 163, 1.0),
    (200, 205, 1.0),
];

/// Parse an interval, panicking on failure.
pub fn parse(text: &str) -> Interval {
    text.parse()
        .unwrap_or_else(|e| panic!("invalid test interval '{}': {}", text, e))
}

pub fn gdc_records() -> Vec<(String, Record)> {
    GDC_READS
        .iter()
        .map(|(start, end, strand)| {
            (
                GDC_SEQNAME.to_string(),
                Record::new(*start, *end, *strand, Some(GDC_SCORE)),
            )
        })
        .collect()
}

/// The gdc reads as an in-memory BED source.
pub fn gdc_source() -> InMemorySource {
    gdc_source_as(SourceKind::Bed)
}

/// The gdc reads as an in-memory source of any (non-dense) kind.
pub fn gdc_source_as(kind: SourceKind) -> InMemorySource {
    let records = gdc_records().into_iter().map(|(seqname, mut record)| {
        let capabilities = kind.capabilities();
        if !capabilities.native_strand {
            record.strand = Strand::Unstranded;
        }
        if !capabilities.native_score {
            record.score = None;
        }
        (seqname, record)
    });
    InMemorySource::from_records(kind, records).expect("invalid gdc records")
}

/// The gdc coverage as an in-memory dense (bigWig kind) source.
pub fn gdc_dense_source() -> InMemorySource {
    let records = GDC_COVERAGE.iter().map(|(start, end, value)| {
        (
            GDC_SEQNAME.to_string(),
            Record::new(*start, *end, Strand::Unstranded, Some(*value)),
        )
    });
    InMemorySource::from_records(SourceKind::BigWig, records).expect("invalid gdc coverage")
}

/// Build a random interval of `width` on `seqname`, ending before `max_end`,
/// on a random strand.
pub fn random_interval(seqname: &str, max_end: Position, width: Position) -> Interval {
    let mut rng = thread_rng();
    let start = rng.gen_range(0..=max_end - width);
    let strand = match rng.gen_range(0..3) {
        0 => Strand::Forward,
        1 => Strand::Reverse,
        _ => Strand::Unstranded,
    };
    Interval::new(seqname, start, start + width)
        .expect("invalid random interval")
        .with_strand(strand)
}

/// Build `n` random single-interval specs of equal `width`.
pub fn random_specs(n: usize, seqname: &str, max_end: Position, width: Position) -> Vec<IntervalSpec> {
    (0..n)
        .map(|_| random_interval(seqname, max_end, width).into())
        .collect()
}

/// Build random reads on `seqname` as `(seqname, record)` pairs.
pub fn random_reads(n: usize, seqname: &str, max_end: Position, read_len: Position) -> Vec<(String, Record)> {
    let mut rng = thread_rng();
    (0..n)
        .map(|_| {
            let start = rng.gen_range(0..=max_end - read_len);
            let strand = if rng.gen_bool(0.5) {
                Strand::Forward
            } else {
                Strand::Reverse
            };
            let score = rng.gen_range(0.0..100.0);
            (
                seqname.to_string(),
                Record::new(start, start + read_len, strand, Some(score)),
            )
        })
        .collect()
}

/// Write `contents` to a temporary file with `suffix`.
pub fn temp_file_with(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("could not create temporary file");
    file.write_all(contents.as_bytes())
        .expect("could not write temporary file");
    file.flush().expect("could not flush temporary file");
    file
}

/// Write gzip-compressed `contents` to a temporary file with `suffix`.
pub fn gzip_file(contents: &str, suffix: &str) -> NamedTempFile {
    let file = Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("could not create temporary file");
    let mut encoder = GzEncoder::new(
        file.reopen().expect("could not reopen temporary file"),
        Compression::default(),
    );
    encoder
        .write_all(contents.as_bytes())
        .expect("could not write temporary file");
    encoder.finish().expect("could not finish gzip stream");
    file
}

/// The gdc reads as BED6 text.
pub fn gdc_bed_text() -> String {
    GDC_READS
        .iter()
        .enumerate()
        .map(|(i, (start, end, strand))| {
            format!(
                "{}\t{}\t{}\tread{}\t{}\t{}\n",
                GDC_SEQNAME, start, end, i, GDC_SCORE, strand
            )
        })
        .collect()
}
