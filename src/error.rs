use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MdMergeError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input not found: {path}")]
    InputNotFound { path: String },

    #[error("No Markdown files found to merge")]
    NothingToMerge { skipped: Vec<String> },

    #[error("Failed to read zip archive {path}: {source}")]
    Archive {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Could not find a free output file name for {base}")]
    OutputPathExhausted { base: PathBuf },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("No input files were given")]
    NoInput,
}

impl MdMergeError {
    /// Process exit code for this error.
    ///
    /// Usage and "nothing found" conditions exit with 2, everything else is
    /// an unexpected failure and exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            MdMergeError::InputNotFound { .. }
            | MdMergeError::NothingToMerge { .. }
            | MdMergeError::NoInput => 2,
            _ => 1,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for MdMergeError {
    fn user_message(&self) -> String {
        match self {
            MdMergeError::Io(e) => format!("File operation failed: {}", e),
            MdMergeError::InputNotFound { path } => format!("Not found: {}", path),
            MdMergeError::NothingToMerge { skipped } => {
                if skipped.is_empty() {
                    "No Markdown files were found to merge".to_string()
                } else {
                    format!(
                        "No Markdown files were found to merge (skipped: {})",
                        skipped.len()
                    )
                }
            }
            MdMergeError::Archive { path, source } => {
                format!("Could not read zip archive {}: {}", path, source)
            }
            MdMergeError::OutputPathExhausted { base } => format!(
                "Could not find a free output file name next to {}",
                base.display()
            ),
            MdMergeError::Config { message } => format!("Configuration error: {}", message),
            MdMergeError::NoInput => "No input files were given".to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            MdMergeError::InputNotFound { .. } => Some(
                "Check the path for typos. Paths containing spaces must be quoted.".to_string(),
            ),
            MdMergeError::NothingToMerge { .. } => Some(
                "Supported extensions are .md, .markdown, .mdown, .mkd, .mkdn, .mdtxt and .mdtext. Folders are scanned recursively and .zip archives are opened.".to_string(),
            ),
            MdMergeError::Archive { .. } => Some(
                "The archive may be damaged or use an unsupported compression method.".to_string(),
            ),
            MdMergeError::OutputPathExhausted { .. } => Some(
                "Clean up old merged files or choose an explicit output path with -o.".to_string(),
            ),
            MdMergeError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate it with --generate-config."
                    .to_string(),
            ),
            MdMergeError::NoInput => Some(
                "Pass files, folders or zip archives as arguments, or drop them onto the executable."
                    .to_string(),
            ),
            MdMergeError::Io(_) => None,
        }
    }
}

impl From<toml::de::Error> for MdMergeError {
    fn from(error: toml::de::Error) -> Self {
        MdMergeError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MdMergeError>;
