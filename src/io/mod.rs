//! Types and methods for reading tab-delimited feature files.

pub mod file;
pub mod parsers;

pub use file::InputFile;
pub use parsers::read_records;
