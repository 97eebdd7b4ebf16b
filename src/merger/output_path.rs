use crate::error::{MdMergeError, Result};
use crate::scanner::file_filter::extension_of;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

pub const OUTPUT_EXTENSION: &str = ".md";

/// Highest counter tried when looking for a free "<name> (n).md".
pub const MAX_NUMBERED_CANDIDATES: u32 = 9999;

const MAX_SYMLINK_HOPS: usize = 40;

/// Appends `.md` unless the path already ends with it (any case).
pub fn ensure_md_extension(path: PathBuf) -> PathBuf {
    let has_extension = {
        let text = path.as_os_str().to_string_lossy();
        let bytes = text.as_bytes();
        bytes.len() >= OUTPUT_EXTENSION.len()
            && bytes[bytes.len() - OUTPUT_EXTENSION.len()..]
                .eq_ignore_ascii_case(OUTPUT_EXTENSION.as_bytes())
    };

    if has_extension {
        path
    } else {
        let mut os: OsString = path.into_os_string();
        os.push(OUTPUT_EXTENSION);
        PathBuf::from(os)
    }
}

/// Output path used when none was given on the command line.
///
/// Lives in the first input's folder (or the working directory when the
/// first input does not exist). A single file input `notes.md` yields
/// `notes_merged.md`, anything else `<default_name>.md`. Existing files are
/// never reused: the first free `<name> (n).md` is returned instead.
pub fn auto_output_path<P: AsRef<Path>>(inputs: &[P], default_name: &str) -> Result<PathBuf> {
    let first = match inputs.first() {
        Some(first) => first.as_ref(),
        None => return Err(MdMergeError::NoInput),
    };

    let dir = if first.is_dir() {
        absolute(first)?
    } else if first.is_file() {
        absolute(first)?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        std::env::current_dir()?
    };

    let base_name = if inputs.len() == 1 && first.is_file() {
        format!("{}_merged", file_stem_of(first))
    } else {
        default_name.to_string()
    };

    make_unique_path(dir.join(format!("{}{}", base_name, OUTPUT_EXTENSION)))
}

/// Returns `path` if nothing exists there, else the first free
/// `<stem> (n)<ext>` next to it.
pub fn make_unique_path(path: PathBuf) -> Result<PathBuf> {
    if !path.exists() {
        return Ok(path);
    }

    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = extension_of(&name).to_string();
    let stem = &name[..name.len() - ext.len()];

    for i in 1..=MAX_NUMBERED_CANDIDATES {
        let candidate = dir.join(format!("{} ({}){}", stem, i, ext));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(MdMergeError::OutputPathExhausted { base: path })
}

/// Writes the merged document as UTF-8 without BOM in a single step.
///
/// The text goes to a temporary file beside the target which then replaces
/// it, so a failed write leaves no partial output behind. A symlinked target
/// is written through, and an existing file keeps its permissions.
pub fn write_output(path: &Path, text: &str) -> Result<u64> {
    let target = resolve_symlinks(&absolute(path)?)?;
    let dir = target
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir)?;

    let mut temp = new_output_temp(&dir)?;
    if let Ok(existing) = fs::metadata(&target) {
        temp.as_file().set_permissions(existing.permissions())?;
    }
    temp.write_all(text.as_bytes())?;
    temp.flush()?;
    temp.persist(&target).map_err(|e| MdMergeError::Io(e.error))?;

    tracing::info!(path = %target.display(), bytes = text.len(), "wrote merged output");

    Ok(text.len() as u64)
}

/// Follows a chain of symlinks to the path that actually receives the data.
/// The final target need not exist yet.
fn resolve_symlinks(path: &Path) -> Result<PathBuf> {
    let mut current = path.to_path_buf();

    for _ in 0..MAX_SYMLINK_HOPS {
        let is_link = fs::symlink_metadata(&current)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false);
        if !is_link {
            return Ok(current);
        }

        let link = fs::read_link(&current)?;
        current = match current.parent() {
            Some(parent) if link.is_relative() => parent.join(link),
            _ => link,
        };
    }

    Err(MdMergeError::Io(std::io::Error::other(format!(
        "too many levels of symbolic links: {}",
        path.display()
    ))))
}

/// Temp file created with the mode a plain `fs::write` would use.
fn new_output_temp(dir: &Path) -> Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".mdmerge-").suffix(".tmp");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }

    Ok(builder.tempfile_in(dir)?)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn file_stem_of(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext_len = extension_of(&name).len();
    name[..name.len() - ext_len].to_string()
}
