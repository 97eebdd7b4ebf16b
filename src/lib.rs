pub mod cli;
pub mod config;
pub mod error;
pub mod merger;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, MergeConfig, OutputConfig, PauseMode, UiConfig};
pub use error::{MdMergeError, Result, UserFriendlyError};

// Core functionality re-exports
pub use merger::{decode, merge, MarkdownItem, MergeReport};
pub use scanner::{InputKind, MarkdownSource, ScanResult, SourceScanner};
pub use ui::{NoopProgress, OutputFormatter, OutputMode, ProgressManager, ProgressSink};

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// What to merge and where to put it.
#[derive(Debug, Clone, Default)]
pub struct MergeRequest {
    pub inputs: Vec<PathBuf>,
    /// Explicit output path; derived from the first input when `None`.
    pub output: Option<PathBuf>,
    /// Enumerate and resolve the output path, but write nothing.
    pub dry_run: bool,
}

/// Main library interface for mdmerge
pub struct MdMerge {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl MdMerge {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let show_progress = config.ui.progress && !quiet && output_mode == OutputMode::Human;
        let progress_manager = ProgressManager::new(show_progress);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    /// Create an MdMerge instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Ok(Self::new(
            config,
            cli_args.output_mode(),
            cli_args.verbose,
            cli_args.quiet,
        ))
    }

    /// Runs one merge: enumerate, decode, concatenate, write.
    ///
    /// Nothing is written unless every input was read successfully.
    pub fn merge(&self, request: &MergeRequest) -> Result<MergeReport> {
        let start_time = Instant::now();

        if request.inputs.is_empty() {
            return Err(MdMergeError::NoInput);
        }

        let scanner = SourceScanner::new(self.config.merge.sort_zip_entries);
        let progress = self.progress_manager.create_merge_progress();
        progress.set_total(scanner.count_items(&request.inputs));

        let scan = scanner.scan(&request.inputs, &progress);
        progress.finish();
        tracing::debug!(processed = progress.position(), "enumeration finished");
        let scan = scan?;

        let output_path = self.resolve_output_path(request)?;
        let items: Vec<MarkdownItem> = scan.sources.iter().map(MarkdownItem::from).collect();
        tracing::info!(
            count = items.len(),
            path = %output_path.display(),
            "merging items"
        );

        let bytes_written = if request.dry_run {
            0
        } else {
            let merged = merge(&items, self.config.merge.source_comments);
            merger::write_output(&output_path, &merged)?
        };

        Ok(MergeReport {
            output_path,
            merged_items: items.len(),
            sources: items.into_iter().map(|item| item.label).collect(),
            skipped_inputs: scan.skipped,
            bytes_written,
            duration: start_time.elapsed(),
            merged_at: Utc::now(),
            dry_run: request.dry_run,
        })
    }

    fn resolve_output_path(&self, request: &MergeRequest) -> Result<PathBuf> {
        match request.output {
            Some(ref output) => Ok(merger::ensure_md_extension(output.clone())),
            None => merger::auto_output_path(&request.inputs, &self.config.output.default_name),
        }
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &MdMergeError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Merges `inputs` in memory without touching the filesystem beyond reading.
///
/// Returns the merged text exactly as it would be written.
pub fn merge_inputs<P: AsRef<Path>>(
    inputs: &[P],
    source_comments: bool,
    sort_zip_entries: bool,
) -> Result<String> {
    let scan = SourceScanner::new(sort_zip_entries).scan(inputs, &NoopProgress)?;
    let items: Vec<MarkdownItem> = scan.sources.iter().map(MarkdownItem::from).collect();
    Ok(merge(&items, source_comments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_instance(config: Config) -> MdMerge {
        MdMerge::new(config, OutputMode::Plain, 0, true)
    }

    #[test]
    fn test_mdmerge_creation() {
        let mdmerge = quiet_instance(Config::default());
        assert!(mdmerge.config().merge.source_comments);
        assert!(mdmerge.config().merge.sort_zip_entries);
    }

    #[test]
    fn test_merge_folder_writes_expected_output() {
        let temp_dir = TempDir::new().unwrap();
        let docs = temp_dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        fs::write(docs.join("x.md"), "Hello").unwrap();
        fs::write(docs.join("y.markdown"), "World").unwrap();
        let output = temp_dir.path().join("out.md");

        let report = quiet_instance(Config::default())
            .merge(&MergeRequest {
                inputs: vec![docs],
                output: Some(output.clone()),
                dry_run: false,
            })
            .unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            "<!-- source: x.md -->\n\nHello\n\n---\n\n<!-- source: y.markdown -->\n\nWorld\n"
        );
        assert_eq!(report.merged_items, 2);
        assert_eq!(report.bytes_written, written.len() as u64);
        assert_eq!(report.sources, vec!["x.md", "y.markdown"]);
        assert!(!report.has_skipped());
    }

    #[test]
    fn test_merge_appends_md_extension_and_reports_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let note = temp_dir.path().join("note.md");
        let other = temp_dir.path().join("image.png");
        fs::write(&note, "text\n").unwrap();
        fs::write(&other, [0u8, 1, 2]).unwrap();

        let report = quiet_instance(Config::default())
            .merge(&MergeRequest {
                inputs: vec![note, other],
                output: Some(temp_dir.path().join("result")),
                dry_run: false,
            })
            .unwrap();

        assert_eq!(report.output_path, temp_dir.path().join("result.md"));
        assert!(report.output_path.exists());
        assert_eq!(report.skipped_inputs.len(), 1);
    }

    #[test]
    fn test_merge_auto_output_path_for_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let note = temp_dir.path().join("notes.md");
        fs::write(&note, "body\n").unwrap();

        let mdmerge = quiet_instance(Config::default());
        let request = MergeRequest {
            inputs: vec![note],
            ..Default::default()
        };

        let first = mdmerge.merge(&request).unwrap();
        assert_eq!(first.output_path, temp_dir.path().join("notes_merged.md"));

        let second = mdmerge.merge(&request).unwrap();
        assert_eq!(
            second.output_path,
            temp_dir.path().join("notes_merged (1).md")
        );
    }

    #[test]
    fn test_merge_uses_configured_default_name() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.md"), "a").unwrap();

        let mut config = Config::default();
        config.output.default_name = "book".to_string();

        let report = quiet_instance(config)
            .merge(&MergeRequest {
                inputs: vec![temp_dir.path().to_path_buf()],
                ..Default::default()
            })
            .unwrap();

        assert_eq!(report.output_path, temp_dir.path().join("book.md"));
    }

    #[test]
    fn test_missing_input_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.md");

        let err = quiet_instance(Config::default())
            .merge(&MergeRequest {
                inputs: vec![
                    temp_dir.path().join("nope1"),
                    temp_dir.path().join("nope2"),
                ],
                output: Some(output.clone()),
                dry_run: false,
            })
            .unwrap_err();

        assert!(matches!(err, MdMergeError::InputNotFound { .. }));
        assert_eq!(err.exit_code(), 2);
        assert!(!output.exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.md"), "a").unwrap();
        fs::write(temp_dir.path().join("b.md"), "b").unwrap();

        let report = quiet_instance(Config::default())
            .merge(&MergeRequest {
                inputs: vec![temp_dir.path().to_path_buf()],
                output: None,
                dry_run: true,
            })
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.merged_items, 2);
        assert_eq!(report.bytes_written, 0);
        assert!(!report.output_path.exists());
    }

    #[test]
    fn test_no_input_is_an_error() {
        let err = quiet_instance(Config::default())
            .merge(&MergeRequest::default())
            .unwrap_err();
        assert!(matches!(err, MdMergeError::NoInput));
    }

    #[test]
    fn test_merge_inputs_without_source_comments() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.md");
        let b = temp_dir.path().join("b.md");
        fs::write(&a, "one\r\n").unwrap();
        fs::write(&b, "two").unwrap();

        let merged = merge_inputs(&[b, a], false, true).unwrap();
        assert_eq!(merged, "two\n\n---\n\none\n");
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        MdMerge::generate_sample_config(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[merge]"));
        assert!(content.contains("[output]"));
        assert!(content.contains("[ui]"));
    }
}
