pub mod archive;
pub mod file_filter;
pub mod source_scanner;

pub use source_scanner::{InputKind, MarkdownSource, ScanResult, SourceScanner};
