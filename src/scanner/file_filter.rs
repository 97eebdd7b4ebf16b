use std::cmp::Ordering;
use std::path::Path;

/// Extensions treated as Markdown, compared case-insensitively.
pub const MARKDOWN_EXTENSIONS: [&str; 7] = [
    ".md",
    ".markdown",
    ".mdown",
    ".mkd",
    ".mkdn",
    ".mdtxt",
    ".mdtext",
];

pub const ZIP_EXTENSION: &str = ".zip";

/// Resource-fork folder added by the macOS archiver; never merged.
pub const MACOS_METADATA_PREFIX: &str = "__MACOSX/";

/// Extension of the last path segment including its leading dot.
///
/// A name whose only dot is the first character (".md") still has an
/// extension; a trailing dot yields an empty one.
pub fn extension_of(name: &str) -> &str {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);

    match file_name.rfind('.') {
        Some(idx) if idx + 1 < file_name.len() => &file_name[idx..],
        _ => "",
    }
}

pub fn is_markdown_name(name: &str) -> bool {
    let ext = extension_of(name);
    MARKDOWN_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
}

pub fn is_zip_name(name: &str) -> bool {
    extension_of(name).eq_ignore_ascii_case(ZIP_EXTENSION)
}

pub fn is_markdown_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| is_markdown_name(&name.to_string_lossy()))
        .unwrap_or(false)
}

pub fn is_zip_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| is_zip_name(&name.to_string_lossy()))
        .unwrap_or(false)
}

pub fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Ordinal comparison after upper-casing every character.
///
/// Characters whose uppercase form is longer than one character (`ß`) are
/// compared unchanged.
pub fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars().map(fold_case).cmp(b.chars().map(fold_case))
}

fn fold_case(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("notes.md"), ".md");
        assert_eq!(extension_of("docs/guide.markdown"), ".markdown");
        assert_eq!(extension_of("dir.v2/README"), "");
        assert_eq!(extension_of("archive.tar.zip"), ".zip");
        assert_eq!(extension_of(".md"), ".md");
        assert_eq!(extension_of("trailing."), "");
        assert_eq!(extension_of(r"win\path\file.MKD"), ".MKD");
    }

    #[test]
    fn test_markdown_detection() {
        for name in [
            "a.md", "a.markdown", "a.mdown", "a.mkd", "a.mkdn", "a.mdtxt", "a.mdtext",
        ] {
            assert!(is_markdown_name(name), "Should accept: {}", name);
        }

        assert!(is_markdown_name("README.MD"));
        assert!(is_markdown_name("Guide.MarkDown"));

        for name in ["a.txt", "a.rst", "a.zip", "README", "a.md.bak", "a.mdx"] {
            assert!(!is_markdown_name(name), "Should reject: {}", name);
        }
    }

    #[test]
    fn test_zip_detection() {
        assert!(is_zip_name("bundle.zip"));
        assert!(is_zip_name("BUNDLE.ZIP"));
        assert!(!is_zip_name("bundle.7z"));
        assert!(is_zip_file(Path::new("some/dir/docs.Zip")));
        assert!(is_markdown_file(Path::new("some/dir/x.md")));
        assert!(!is_markdown_file(Path::new("some/dir/")));
    }

    #[test]
    fn test_starts_with_ignore_case() {
        assert!(starts_with_ignore_case("__MACOSX/a.md", MACOS_METADATA_PREFIX));
        assert!(starts_with_ignore_case("__macosx/docs/._a.md", MACOS_METADATA_PREFIX));
        assert!(!starts_with_ignore_case("docs/__MACOSX/a.md", MACOS_METADATA_PREFIX));
        assert!(!starts_with_ignore_case("__MAC", MACOS_METADATA_PREFIX));
    }

    #[test]
    fn test_compare_ignore_case() {
        assert_eq!(compare_ignore_case("a.md", "B.MD"), Ordering::Less);
        assert_eq!(compare_ignore_case("B.md", "a.md"), Ordering::Greater);
        assert_eq!(compare_ignore_case("Same.md", "same.MD"), Ordering::Equal);
    }

    #[test]
    fn test_compare_ignore_case_maps_one_char_to_one() {
        assert_eq!(compare_ignore_case("ß.md", "st.md"), Ordering::Greater);
        assert_eq!(compare_ignore_case("ß.md", "SS.md"), Ordering::Greater);
        assert_eq!(compare_ignore_case("é.md", "É.MD"), Ordering::Equal);
    }
}
