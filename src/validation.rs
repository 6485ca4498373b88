//! Option validation against source capabilities.
//!
//! Every check here runs before any data is read. Options that only make sense for
//! some kinds of data (e.g. `use_score` on aligned reads, which carry no score) are
//! rejected with [`GSignalError::UnsupportedArgument`]; options with structurally
//! invalid values are rejected with [`GSignalError::InvalidArgument`].
//!
//! Format-native binning methods are *not* checked here: they fail lazily with
//! [`GSignalError::UnsupportedOperation`] when invoked on a source that cannot
//! perform them.

use log::debug;

use crate::{
    error::GSignalError,
    options::{Bins, OptionName, Options},
    ranges::Strand,
    sources::{Capabilities, SourceKind},
};

/// Whether `option` is legal for a source with `capabilities`.
pub fn is_legal(option: OptionName, capabilities: &Capabilities) -> bool {
    match option {
        OptionName::Bins
        | OptionName::Method
        | OptionName::Accumulate
        | OptionName::Processes
        | OptionName::Ragged => true,
        OptionName::Stranded
        | OptionName::ReadStrand
        | OptionName::ShiftWidth
        | OptionName::FragmentSize => capabilities.native_strand,
        OptionName::UseScore => capabilities.native_score,
        OptionName::PreserveTotal => !capabilities.dense,
    }
}

/// The options legal for `kind`.
pub fn legal_options(kind: SourceKind) -> Vec<OptionName> {
    let capabilities = kind.capabilities();
    OptionName::ALL
        .into_iter()
        .filter(|option| is_legal(*option, &capabilities))
        .collect()
}

/// Validate `options` for a source of `kind`, evaluating `n_rows` output rows.
pub fn validate_options(
    kind: SourceKind,
    options: &Options,
    n_rows: usize,
) -> Result<(), GSignalError> {
    let capabilities = kind.capabilities();
    for option in options.supplied() {
        if !is_legal(option, &capabilities) {
            return Err(GSignalError::UnsupportedArgument { option, kind });
        }
    }

    if options.processes == 0 {
        return Err(GSignalError::InvalidArgument(
            "processes must be at least 1".to_string(),
        ));
    }
    if options.fragment_size == Some(0) {
        return Err(GSignalError::InvalidArgument(
            "fragment_size must be at least 1".to_string(),
        ));
    }
    if options.read_strand == Some(Strand::Unstranded) {
        return Err(GSignalError::InvalidArgument(
            "read_strand must be '+' or '-'".to_string(),
        ));
    }
    match &options.bins {
        Some(Bins::Fixed(0)) => {
            return Err(GSignalError::InvalidArgument(
                "bins must be at least 1".to_string(),
            ))
        }
        Some(Bins::PerInterval(counts)) => {
            if counts.len() != n_rows {
                return Err(GSignalError::InvalidArgument(format!(
                    "{} bin counts were given for {} intervals",
                    counts.len(),
                    n_rows
                )));
            }
            if counts.contains(&0) {
                return Err(GSignalError::InvalidArgument(
                    "bins must be at least 1".to_string(),
                ));
            }
        }
        _ => {}
    }
    if options.preserve_total && options.effective_method().is_native() {
        return Err(GSignalError::InvalidArgument(format!(
            "preserve_total cannot be combined with method '{}'",
            options.effective_method()
        )));
    }

    debug!(
        "validated options {:?} for {} source ({} rows)",
        options.supplied(),
        kind,
        n_rows
    );
    Ok(())
}

/// Validate a `count` call: stranded counting needs stranded records.
pub fn validate_count(kind: SourceKind, stranded: bool) -> Result<(), GSignalError> {
    if stranded && !kind.capabilities().native_strand {
        return Err(GSignalError::UnsupportedArgument {
            option: OptionName::Stranded,
            kind,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::Method;

    fn assert_unsupported(kind: SourceKind, options: Options, expected: OptionName) {
        match validate_options(kind, &options, 1) {
            Err(GSignalError::UnsupportedArgument { option, .. }) => assert_eq!(option, expected),
            other => panic!("expected unsupported {} on {}, got {:?}", expected, kind, other),
        }
    }

    #[test]
    fn test_defaults_legal_everywhere() {
        for kind in SourceKind::ALL {
            validate_options(kind, &Options::default(), 1).unwrap();
            validate_options(
                kind,
                &Options::default().bins(10).method(Method::BinCovered).processes(3),
                1,
            )
            .unwrap();
        }
    }

    #[test]
    fn test_use_score_rejected_on_bam() {
        assert_unsupported(
            SourceKind::Bam,
            Options::default().use_score(true),
            OptionName::UseScore,
        );
        validate_options(SourceKind::Bed, &Options::default().use_score(true), 1).unwrap();
        validate_options(SourceKind::Vcf, &Options::default().use_score(true), 1).unwrap();
    }

    #[test]
    fn test_bigwig_rejections() {
        let kind = SourceKind::BigWig;
        assert_unsupported(kind, Options::default().stranded(true), OptionName::Stranded);
        assert_unsupported(kind, Options::default().shift_width(1), OptionName::ShiftWidth);
        assert_unsupported(
            kind,
            Options::default().fragment_size(100),
            OptionName::FragmentSize,
        );
        assert_unsupported(
            kind,
            Options::default().read_strand(Strand::Forward),
            OptionName::ReadStrand,
        );
        assert_unsupported(kind, Options::default().use_score(true), OptionName::UseScore);
        assert_unsupported(
            kind,
            Options::default().preserve_total(true),
            OptionName::PreserveTotal,
        );
    }

    #[test]
    fn test_vcf_strand_rejections() {
        assert_unsupported(
            SourceKind::Vcf,
            Options::default().stranded(true),
            OptionName::Stranded,
        );
    }

    #[test]
    fn test_legal_options() {
        let legal = legal_options(SourceKind::BigWig);
        assert_eq!(
            legal,
            vec![
                OptionName::Bins,
                OptionName::Method,
                OptionName::Accumulate,
                OptionName::Ragged,
                OptionName::Processes
            ]
        );
        assert_eq!(legal_options(SourceKind::Bed).len(), OptionName::ALL.len());
    }

    #[test]
    fn test_structural_errors() {
        let kind = SourceKind::Bed;
        let invalid = [
            Options::default().processes(0),
            Options::default().fragment_size(0),
            Options::default().read_strand(Strand::Unstranded),
            Options::default().bins(0),
            Options::default().bins_per_interval(vec![3, 0]),
            Options::default().bins_per_interval(vec![3]),
            Options::default()
                .preserve_total(true)
                .method(Method::UcscSummarize),
        ];
        for options in invalid {
            assert!(
                matches!(
                    validate_options(kind, &options, 2),
                    Err(GSignalError::InvalidArgument(_))
                ),
                "{:?}",
                options
            );
        }
    }

    #[test]
    fn test_native_method_not_rejected_early() {
        validate_options(
            SourceKind::Bam,
            &Options::default().method(Method::Summarize).bins(10),
            1,
        )
        .unwrap();
    }

    #[test]
    fn test_validate_count() {
        validate_count(SourceKind::Bam, true).unwrap();
        validate_count(SourceKind::BigWig, false).unwrap();
        assert!(validate_count(SourceKind::BigWig, true)
            .unwrap_err()
            .is_argument_error());
    }
}
