use crate::error::{MdMergeError, Result};
use crate::scanner::archive;
use crate::scanner::file_filter::{compare_ignore_case, is_markdown_file, is_zip_file};
use crate::ui::progress::ProgressSink;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// How a top-level input path is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Directory,
    Markdown,
    Archive,
    Unrecognized,
    Missing,
}

impl InputKind {
    pub fn classify(path: &Path) -> Self {
        if path.is_dir() {
            InputKind::Directory
        } else if !path.is_file() {
            InputKind::Missing
        } else if is_zip_file(path) {
            InputKind::Archive
        } else if is_markdown_file(path) {
            InputKind::Markdown
        } else {
            InputKind::Unrecognized
        }
    }
}

/// Raw content of one Markdown file or archive entry, paired with the label
/// shown in its provenance comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownSource {
    pub label: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct ScanResult {
    pub sources: Vec<MarkdownSource>,
    /// Top-level inputs that were neither folders, Markdown files nor zips.
    pub skipped: Vec<String>,
}

pub struct SourceScanner {
    sort_zip_entries: bool,
}

impl SourceScanner {
    pub fn new(sort_zip_entries: bool) -> Self {
        Self { sort_zip_entries }
    }

    /// Collects every Markdown item reachable from `inputs`, in input order.
    ///
    /// A missing input aborts the whole scan. Producing no items at all is an
    /// error as well, carrying the skip list.
    pub fn scan<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        progress: &dyn ProgressSink,
    ) -> Result<ScanResult> {
        let mut result = ScanResult::default();

        for input in inputs {
            let input = input.as_ref();

            match InputKind::classify(input) {
                InputKind::Directory => {
                    for file in self.markdown_files_in(input)? {
                        progress.item_started(&file.display().to_string());
                        result.sources.push(read_file_source(&file)?);
                        progress.item_finished();
                    }
                }
                InputKind::Missing => {
                    return Err(MdMergeError::InputNotFound {
                        path: input.display().to_string(),
                    });
                }
                InputKind::Archive => {
                    let sources =
                        archive::read_markdown_entries(input, self.sort_zip_entries, progress)?;
                    result.sources.extend(sources);
                }
                InputKind::Markdown => {
                    progress.item_started(&input.display().to_string());
                    result.sources.push(read_file_source(input)?);
                    progress.item_finished();
                }
                InputKind::Unrecognized => {
                    tracing::info!(input = %input.display(), "skipping unsupported input");
                    result.skipped.push(input.display().to_string());
                }
            }
        }

        if result.sources.is_empty() {
            return Err(MdMergeError::NothingToMerge {
                skipped: result.skipped,
            });
        }

        tracing::debug!(
            count = result.sources.len(),
            skipped = result.skipped.len(),
            "scan finished"
        );

        Ok(result)
    }

    /// Advisory item total for progress display; never less than 1.
    ///
    /// Unlike [`scan`](Self::scan) this never fails: unreadable folders and
    /// corrupt archives simply contribute nothing.
    pub fn count_items<P: AsRef<Path>>(&self, inputs: &[P]) -> usize {
        let total: usize = inputs
            .iter()
            .map(|input| {
                let input = input.as_ref();
                match InputKind::classify(input) {
                    InputKind::Directory => WalkDir::new(input)
                        .follow_links(true)
                        .into_iter()
                        .filter_map(|entry| entry.ok())
                        .filter(|entry| entry.file_type().is_file() && is_markdown_file(entry.path()))
                        .count(),
                    InputKind::Archive => archive::count_markdown_entries(input).unwrap_or(0),
                    InputKind::Markdown => 1,
                    InputKind::Unrecognized | InputKind::Missing => 0,
                }
            })
            .sum();

        total.max(1)
    }

    /// Markdown files below `root`, recursively, sorted case-insensitively by
    /// full path.
    pub fn markdown_files_in(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        // Symlinked files count as files; walkdir reports link loops as errors.
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(|err| MdMergeError::Io(err.into()))?;
            if entry.file_type().is_file() && is_markdown_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        // Ordinal tie-break keeps names differing only in case deterministic.
        files.sort_by(|a, b| {
            let (a, b) = (a.to_string_lossy(), b.to_string_lossy());
            compare_ignore_case(&a, &b).then_with(|| a.cmp(&b))
        });

        Ok(files)
    }
}

impl Default for SourceScanner {
    fn default() -> Self {
        Self::new(true)
    }
}

fn read_file_source(path: &Path) -> Result<MarkdownSource> {
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(MarkdownSource {
        label,
        bytes: fs::read(path)?,
    })
}
