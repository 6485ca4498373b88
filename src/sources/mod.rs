//! Signal sources: the set of supported kinds, their capabilities, and the adapters.
//!
//!  - [`memory::InMemorySource`]: an interval-tree index of records, used for the
//!    tab-delimited feature formats (BED, GFF, GTF, VCF) and for data built in code.
//!  - [`bam::BamSource`]: indexed BAM alignments, via `noodles`.
//!  - [`bbi::BigWigSource`] and [`bbi::BigBedSource`]: via `bigtools`.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GSignalError;

#[cfg(feature = "bam")]
pub mod bam;
#[cfg(feature = "bbi")]
pub mod bbi;
pub mod memory;
pub mod summary;

/// The fixed set of source kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Bam,
    Bed,
    Gff,
    Gtf,
    Vcf,
    #[value(name = "bigbed")]
    BigBed,
    #[value(name = "bigwig")]
    BigWig,
}

/// What a source kind can do natively. The option validator uses these to decide
/// which options are legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Can summarize a window into bins itself (`summarize`, `ucsc_summarize`).
    pub native_binning: bool,
    /// Records carry a score.
    pub native_score: bool,
    /// Records carry a strand.
    pub native_strand: bool,
    /// Records are blocks of a continuous signal, weighted by their value.
    pub dense: bool,
}

impl SourceKind {
    pub const ALL: [SourceKind; 7] = [
        SourceKind::Bam,
        SourceKind::Bed,
        SourceKind::Gff,
        SourceKind::Gtf,
        SourceKind::Vcf,
        SourceKind::BigBed,
        SourceKind::BigWig,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Bam => "bam",
            SourceKind::Bed => "bed",
            SourceKind::Gff => "gff",
            SourceKind::Gtf => "gtf",
            SourceKind::Vcf => "vcf",
            SourceKind::BigBed => "bigbed",
            SourceKind::BigWig => "bigwig",
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            SourceKind::Bam => Capabilities {
                native_binning: false,
                native_score: false,
                native_strand: true,
                dense: false,
            },
            SourceKind::Bed | SourceKind::Gff | SourceKind::Gtf | SourceKind::BigBed => {
                Capabilities {
                    native_binning: false,
                    native_score: true,
                    native_strand: true,
                    dense: false,
                }
            }
            SourceKind::Vcf => Capabilities {
                native_binning: false,
                native_score: true,
                native_strand: false,
                dense: false,
            },
            SourceKind::BigWig => Capabilities {
                native_binning: true,
                native_score: false,
                native_strand: false,
                dense: true,
            },
        }
    }

    /// Whether this kind is one of the tab-delimited text formats loaded into memory.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            SourceKind::Bed | SourceKind::Gff | SourceKind::Gtf | SourceKind::Vcf
        )
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SourceKind {
    type Err = GSignalError;

    /// Parse a kind name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <SourceKind as ValueEnum>::from_str(s, true).map_err(|_| {
            GSignalError::UnsupportedSourceKind(s.to_string(), supported_formats().join(", "))
        })
    }
}

/// The names of every supported source kind.
pub fn supported_formats() -> Vec<&'static str> {
    SourceKind::ALL.iter().map(|kind| kind.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_formats() {
        assert_eq!(
            supported_formats(),
            vec!["bam", "bed", "gff", "gtf", "vcf", "bigbed", "bigwig"]
        );
    }

    #[test]
    fn test_kind_parse() {
        for kind in SourceKind::ALL {
            assert_eq!(kind.name().parse::<SourceKind>().unwrap(), kind);
        }
        assert_eq!("BigWig".parse::<SourceKind>().unwrap(), SourceKind::BigWig);
        assert!(matches!(
            "fasta".parse::<SourceKind>(),
            Err(GSignalError::UnsupportedSourceKind(..))
        ));
    }

    #[test]
    fn test_capabilities() {
        assert!(SourceKind::BigWig.capabilities().dense);
        assert!(SourceKind::BigWig.capabilities().native_binning);
        assert!(!SourceKind::Bam.capabilities().native_score);
        assert!(!SourceKind::Vcf.capabilities().native_strand);
        assert!(SourceKind::BigBed.capabilities().native_score);
    }
}
