pub mod decode;
pub mod merge_engine;
pub mod output_path;
pub mod report;

pub use decode::{decode, normalize_newlines};
pub use merge_engine::{merge, MarkdownItem};
pub use output_path::{auto_output_path, ensure_md_extension, make_unique_path, write_output};
pub use report::MergeReport;
