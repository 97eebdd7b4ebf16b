use crate::error::{MdMergeError, Result};
use crate::scanner::file_filter::{
    compare_ignore_case, is_markdown_name, starts_with_ignore_case, MACOS_METADATA_PREFIX,
};
use crate::scanner::source_scanner::MarkdownSource;
use crate::ui::progress::ProgressSink;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Largest buffer reserved before reading an entry.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// A Markdown entry selected from an archive, addressed by its index in the
/// central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub index: usize,
    pub name: String,
}

/// Whether an archive entry name should be merged.
///
/// Directory pseudo-entries, anything under the macOS metadata folder and
/// entries without a Markdown extension are rejected.
pub fn is_mergeable_entry(name: &str) -> bool {
    !name.is_empty()
        && !name.ends_with('/')
        && !starts_with_ignore_case(name, MACOS_METADATA_PREFIX)
        && is_markdown_name(name)
}

pub fn open_archive(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path)?;
    ZipArchive::new(file).map_err(|source| archive_error(path, source))
}

/// Mergeable entries in native archive order, or sorted case-insensitively
/// by full entry path when `sort` is set.
pub fn markdown_entries<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    sort: bool,
) -> std::result::Result<Vec<ArchiveEntry>, zip::result::ZipError> {
    let mut entries = Vec::new();

    for index in 0..archive.len() {
        let name = archive.by_index_raw(index)?.name().to_string();
        if is_mergeable_entry(&name) {
            entries.push(ArchiveEntry { index, name });
        }
    }

    if sort {
        // Stable: entries equal ignoring case keep their archive order.
        entries.sort_by(|a, b| compare_ignore_case(&a.name, &b.name));
    }

    Ok(entries)
}

/// Number of mergeable entries, or `None` when the archive cannot be read.
pub fn count_markdown_entries(path: &Path) -> Option<usize> {
    let mut archive = open_archive(path).ok()?;
    markdown_entries(&mut archive, false)
        .ok()
        .map(|entries| entries.len())
}

/// Reads every mergeable entry fully into memory.
///
/// Labels take the form `<archive file name>:<entry path>`.
pub fn read_markdown_entries(
    path: &Path,
    sort: bool,
    progress: &dyn ProgressSink,
) -> Result<Vec<MarkdownSource>> {
    let mut archive = open_archive(path)?;
    let entries =
        markdown_entries(&mut archive, sort).map_err(|source| archive_error(path, source))?;

    let archive_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    tracing::debug!(archive = %path.display(), count = entries.len(), "reading zip entries");

    let mut sources = Vec::with_capacity(entries.len());
    for entry in entries {
        let label = format!("{}:{}", archive_name, entry.name);
        progress.item_started(&label);

        let mut file = archive
            .by_index(entry.index)
            .map_err(|source| archive_error(path, source))?;
        // The declared size is untrusted; cap the up-front allocation.
        let mut bytes = Vec::with_capacity(file.size().min(MAX_PREALLOCATION) as usize);
        file.read_to_end(&mut bytes)?;

        sources.push(MarkdownSource { label, bytes });
        progress.item_finished();
    }

    Ok(sources)
}

fn archive_error(path: &Path, source: zip::result::ZipError) -> MdMergeError {
    MdMergeError::Archive {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::progress::NoopProgress;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        for (name, content) in entries {
            if name.ends_with('/') {
                writer
                    .add_directory(name.trim_end_matches('/'), SimpleFileOptions::default())
                    .unwrap();
            } else {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(content).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_mergeable_entry_rules() {
        assert!(is_mergeable_entry("notes.md"));
        assert!(is_mergeable_entry("docs/Guide.MARKDOWN"));
        assert!(!is_mergeable_entry(""));
        assert!(!is_mergeable_entry("docs/"));
        assert!(!is_mergeable_entry("docs.md/"));
        assert!(!is_mergeable_entry("__MACOSX/._notes.md"));
        assert!(!is_mergeable_entry("__macosx/docs/notes.md"));
        assert!(!is_mergeable_entry("image.png"));
    }

    #[test]
    fn test_entries_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("bundle.zip");
        write_zip(
            &zip_path,
            &[
                ("b.md", b"B"),
                ("docs/", b""),
                ("__MACOSX/._a.md", b"junk"),
                ("A.md", b"A"),
                ("picture.png", b"png"),
                ("docs/c.mkd", b"C"),
            ],
        );

        let mut archive = open_archive(&zip_path).unwrap();
        let sorted: Vec<String> = markdown_entries(&mut archive, true)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(sorted, vec!["A.md", "b.md", "docs/c.mkd"]);

        let native: Vec<String> = markdown_entries(&mut archive, false)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(native, vec!["b.md", "A.md", "docs/c.mkd"]);
    }

    #[test]
    fn test_read_entries_labels_and_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("notes.zip");
        write_zip(&zip_path, &[("z.md", b"last"), ("sub/a.md", b"first")]);

        let sources = read_markdown_entries(&zip_path, true, &NoopProgress).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].label, "notes.zip:sub/a.md");
        assert_eq!(sources[0].bytes, b"first");
        assert_eq!(sources[1].label, "notes.zip:z.md");
    }

    /// Single stored, empty entry whose zip64 extra field declares an
    /// uncompressed size of 2^60 bytes.
    fn oversized_zip64_archive(name: &str) -> Vec<u8> {
        let mut extra = Vec::new();
        extra.extend_from_slice(&0x0001u16.to_le_bytes());
        extra.extend_from_slice(&16u16.to_le_bytes());
        extra.extend_from_slice(&(1u64 << 60).to_le_bytes());
        extra.extend_from_slice(&0u64.to_le_bytes());

        let mut out = Vec::new();
        out.extend_from_slice(&0x04034b50u32.to_le_bytes());
        out.extend_from_slice(&45u16.to_le_bytes());
        out.extend_from_slice(&[0u8; 8]); // flags, method, time, date
        out.extend_from_slice(&0u32.to_le_bytes()); // crc32 of no data
        out.extend_from_slice(&u32::MAX.to_le_bytes());
        out.extend_from_slice(&u32::MAX.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&extra);

        let central_offset = out.len() as u32;
        out.extend_from_slice(&0x02014b50u32.to_le_bytes());
        out.extend_from_slice(&45u16.to_le_bytes());
        out.extend_from_slice(&45u16.to_le_bytes());
        out.extend_from_slice(&[0u8; 8]);
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&u32::MAX.to_le_bytes());
        out.extend_from_slice(&u32::MAX.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        out.extend_from_slice(&[0u8; 10]); // comment len, disk, attributes
        out.extend_from_slice(&0u32.to_le_bytes()); // local header offset
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&extra);
        let central_size = out.len() as u32 - central_offset;

        out.extend_from_slice(&0x06054b50u32.to_le_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&central_size.to_le_bytes());
        out.extend_from_slice(&central_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }

    #[test]
    fn test_oversized_declared_entry_does_not_preallocate() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("huge.zip");
        std::fs::write(&zip_path, oversized_zip64_archive("big.md")).unwrap();

        match read_markdown_entries(&zip_path, true, &NoopProgress) {
            Ok(sources) => assert!(sources.iter().all(|s| s.bytes.is_empty())),
            Err(MdMergeError::Archive { .. }) | Err(MdMergeError::Io(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_count_tolerates_corrupt_archive() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("broken.zip");
        std::fs::write(&zip_path, b"this is not a zip file").unwrap();

        assert_eq!(count_markdown_entries(&zip_path), None);

        let result = read_markdown_entries(&zip_path, true, &NoopProgress);
        assert!(matches!(result, Err(MdMergeError::Archive { .. })));
    }
}
