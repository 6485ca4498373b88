//! File-backed text sources against the in-memory gdc source.

use gsignal::{
    prelude::*,
    test_utilities::{gdc_bed_text, gdc_source, gdc_source_as, gzip_file, parse, temp_file_with},
};

fn windows() -> Vec<IntervalSpec> {
    ["chr2L:1-80", "chr2L:68-76", "chr2L:135-170", "chr2L:140-148[-]", "chr2L:1000-1020"]
        .iter()
        .map(|text| parse(text).into())
        .collect()
}

fn assert_same_signal(file: &mut GenomicSignal, reference: &mut GenomicSignal, options: &Options) {
    for spec in windows() {
        let from_file = file.local_coverage(&spec, options).unwrap();
        let from_memory = reference.local_coverage(&spec, options).unwrap();
        assert_eq!(from_file, from_memory, "spec {:?}", spec);
    }
}

#[test]
fn test_bed_file_matches_memory() {
    let mut file = genomic_signal("tests_data/gdc.bed", "bed").unwrap();
    let mut reference = GenomicSignal::from_source(gdc_source());
    assert_eq!(file.total_record_count(false).unwrap(), 8);
    assert_same_signal(&mut file, &mut reference, &Options::default());
    assert_same_signal(&mut file, &mut reference, &Options::default().stranded(true).bins(5));
    assert_same_signal(&mut file, &mut reference, &Options::default().use_score(true));
}

#[test]
fn test_gzipped_bed_matches_plain() {
    let mut gzipped = genomic_signal("tests_data/gdc.bed.gz", "BED").unwrap();
    let mut plain = genomic_signal("tests_data/gdc.bed", "bed").unwrap();
    assert_same_signal(&mut gzipped, &mut plain, &Options::default().fragment_size(20));
}

#[test]
fn test_gff_and_gtf_match_bed() {
    let mut bed = GenomicSignal::from_source(gdc_source());
    for (path, kind) in [("tests_data/gdc.gff", "gff"), ("tests_data/gdc.gtf", "gtf")] {
        let mut annotation = genomic_signal(path, kind).unwrap();
        assert_same_signal(&mut annotation, &mut bed, &Options::default().shift_width(3));
        let interval = parse("chr2L:71-73[-]");
        assert_eq!(annotation.count(&interval, true).unwrap(), 1);
        assert_eq!(annotation.count(&interval, false).unwrap(), 2);
    }
}

#[test]
fn test_vcf_is_unstranded() {
    let mut vcf = genomic_signal("tests_data/gdc.vcf", "vcf").unwrap();
    let mut reference = GenomicSignal::from_source(gdc_source_as(SourceKind::Vcf));
    assert_same_signal(&mut vcf, &mut reference, &Options::default().bins(4));

    let coverage = vcf
        .local_coverage(&parse("chr2L:68-76").into(), &Options::default().use_score(true))
        .unwrap();
    assert_eq!(coverage.y, vec![0., 0., 510., 510., 510., 510., 510., 0.]);
}

#[test]
fn test_temporary_files() {
    let plain = temp_file_with(&gdc_bed_text(), ".bed");
    let gzipped = gzip_file(&gdc_bed_text(), ".bed.gz");
    let mut from_plain = GenomicSignal::open(plain.path(), SourceKind::Bed).unwrap();
    let mut from_gzipped = GenomicSignal::open(gzipped.path(), SourceKind::Bed).unwrap();
    assert_same_signal(&mut from_plain, &mut from_gzipped, &Options::default().bins(8));
}

#[test]
fn test_bad_rows_are_parse_errors() {
    let file = temp_file_with("chr2L\t10\tfifteen\tread0\t255\t+\n", ".bed");
    let error = GenomicSignal::open(file.path(), SourceKind::Bed).unwrap_err();
    assert!(matches!(error, GSignalError::InvalidRecord(_)), "{:?}", error);

    let file = temp_file_with("chr2L\t20\t10\n", ".bed");
    assert!(GenomicSignal::open(file.path(), SourceKind::Bed).is_err());
}

#[test]
fn test_missing_file() {
    assert!(genomic_signal("tests_data/no_such_file.bed", "bed").is_err());
}

#[test]
fn test_supported_formats() {
    let formats = supported_formats();
    for kind in ["bed", "gff", "gtf", "vcf"] {
        assert!(formats.contains(&kind), "{} missing", kind);
    }
}
