//! Input file handling with [`InputFile`].
//!
//! This abstracts over reading both plaintext and gzip-compressed input, and
//! builds the [`csv`] readers used by the tab-delimited parsers.

use csv::{Reader, ReaderBuilder};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use crate::error::GSignalError;

/// Check if a file is a gzipped by looking for the magic numbers
pub fn is_gzipped_file(file_path: impl Into<PathBuf>) -> io::Result<bool> {
    let mut file = File::open(file_path.into())?;
    let mut buffer = [0; 2];
    match file.read_exact(&mut buffer) {
        Ok(()) => Ok(buffer == [0x1f, 0x8b]),
        // files shorter than the magic number are not gzipped
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

/// Represents an input file.
///
/// Gzip-compressed input is detected by its magic number rather than its
/// extension, so both plaintext and compressed files are read through a
/// common interface.
#[derive(Clone, Debug)]
pub struct InputFile {
    pub filepath: PathBuf,
}

impl InputFile {
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
        }
    }

    /// Opens the file and returns a buffered reader, decompressing if needed.
    pub fn reader(&self) -> io::Result<BufReader<Box<dyn Read>>> {
        let file = File::open(&self.filepath)?;
        let reader: Box<dyn Read> = if is_gzipped_file(&self.filepath)? {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(BufReader::new(reader))
    }

    /// Build a tab-delimited reader which ignores `#` comment lines and allows
    /// rows of varying width.
    pub fn tsv_reader(&self) -> Result<Reader<Box<dyn Read>>, GSignalError> {
        let stream: Box<dyn Read> = Box::new(self.reader()?);
        let reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .quoting(false)
            .from_reader(stream);
        Ok(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::{gzip_file, temp_file_with};

    #[test]
    fn test_plain_and_gzipped_read_the_same() {
        let contents = "#comment\nchr1\t0\t5\nchr1\t10\t20\n";
        let plain = temp_file_with(contents, ".bed");
        let gzipped = gzip_file(contents, ".bed.gz");
        assert!(!is_gzipped_file(plain.path()).unwrap());
        assert!(is_gzipped_file(gzipped.path()).unwrap());

        let read_rows = |path: &std::path::Path| {
            let mut reader = InputFile::new(path).tsv_reader().unwrap();
            reader
                .records()
                .map(|r| r.unwrap().iter().map(String::from).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        };
        let rows = read_rows(plain.path());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows, read_rows(gzipped.path()));
    }

    #[test]
    fn test_empty_file() {
        let file = temp_file_with("", ".bed");
        assert!(!is_gzipped_file(file.path()).unwrap());
    }
}
