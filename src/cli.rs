use crate::config::{CliOverrides, Config, PauseMode};
use crate::error::Result;
use crate::ui::OutputMode;
use clap::builder::{OsStringValueParser, TypedValueParser};
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mdmerge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Merge Markdown from files, folders and zip archives into one document")]
#[command(
    long_about = "mdmerge concatenates Markdown files, every Markdown file found in folders \
                  (recursively) and Markdown entries inside zip archives into a single .md \
                  file, separated by horizontal rules and tagged with source comments."
)]
#[command(after_help = "EXAMPLES:\n  \
    mdmerge notes.md chapter1.md chapter2.md\n  \
    mdmerge docs/ bundle.zip -o book.md\n  \
    mdmerge -i a.md b.md --no-source --no-sort-zip\n\n\
    Without -o the result is written next to the first input, as\n\
    <name>_merged.md for a single file or merged.md otherwise, numbered\n\
    \"merged (1).md\", \"merged (2).md\", ... when the name is taken.")]
pub struct Cli {
    /// Markdown files, folders or zip archives to merge
    #[arg(value_name = "INPUT", value_parser = OsStringValueParser::new().map(parse_path_arg))]
    pub inputs: Vec<PathBuf>,

    /// More inputs (consumes every following value up to the next option)
    #[arg(
        short = 'i',
        value_name = "INPUT",
        num_args = 0..,
        action = clap::ArgAction::Append,
        value_parser = OsStringValueParser::new().map(parse_path_arg)
    )]
    pub extra_inputs: Vec<PathBuf>,

    /// Output file (".md" is appended when missing)
    #[arg(short, value_name = "FILE", value_parser = OsStringValueParser::new().map(parse_path_arg))]
    pub output: Option<PathBuf>,

    /// Do not insert "<!-- source: ... -->" comments
    #[arg(long)]
    pub no_source: bool,

    /// Keep the archive's own entry order instead of sorting by path
    #[arg(long)]
    pub no_sort_zip: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// When to wait for Enter before exiting
    #[arg(long, value_enum)]
    pub pause: Option<PauseMode>,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show what would be merged without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a sample configuration file
    #[arg(long)]
    pub generate_config: bool,

    /// Positional and -i inputs in command-line order
    #[arg(skip)]
    pub ordered_inputs: Vec<PathBuf>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl From<&OutputFormat> for OutputMode {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl Cli {
    /// Parses arguments, recording positional and `-i` inputs in the order
    /// they were given.
    pub fn try_parse_ordered<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let mut cli = Self::from_arg_matches(&matches)?;
        cli.ordered_inputs = ordered_inputs(&matches);
        Ok(cli)
    }

    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        config.merge_with_cli_args(&self.create_cli_overrides());
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_source_comments(self.no_source.then_some(false))
            .with_sort_zip_entries(self.no_sort_zip.then_some(false))
            .with_progress(self.quiet.then_some(false))
            .with_pause(self.pause)
    }

    /// Every input path, positional and `-i` alike, in command-line order.
    pub fn input_paths(&self) -> Vec<PathBuf> {
        if self.ordered_inputs.is_empty() {
            self.inputs
                .iter()
                .chain(self.extra_inputs.iter())
                .cloned()
                .collect()
        } else {
            self.ordered_inputs.clone()
        }
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.output
            .clone()
            .filter(|o| !o.as_os_str().is_empty())
    }

    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from(&self.output_format)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    pub fn usage_text() -> String {
        Self::command().render_help().to_string()
    }
}

fn ordered_inputs(matches: &ArgMatches) -> Vec<PathBuf> {
    let mut indexed: Vec<(usize, PathBuf)> = Vec::new();

    for id in ["inputs", "extra_inputs"] {
        if let (Some(values), Some(indices)) =
            (matches.get_many::<PathBuf>(id), matches.indices_of(id))
        {
            indexed.extend(indices.zip(values.cloned()));
        }
    }

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, value)| value).collect()
}

/// Path argument with surrounding whitespace and one pair of double quotes
/// removed, as left behind by some shells and drag-and-drop launches.
/// Arguments that are not valid Unicode are kept as given.
pub fn parse_path_arg(raw: OsString) -> PathBuf {
    match raw.to_str() {
        Some(text) => PathBuf::from(trim_quotes(text)),
        None => PathBuf::from(raw),
    }
}

pub fn trim_quotes(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}
