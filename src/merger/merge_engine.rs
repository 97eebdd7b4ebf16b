use crate::merger::decode::decode_normalized;
use crate::scanner::MarkdownSource;

/// Horizontal rule placed between merged items.
pub const SEPARATOR: &str = "\n---\n\n";

/// Decoded, newline-normalized text of one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownItem {
    pub label: String,
    pub text: String,
}

impl MarkdownItem {
    pub fn new<L: Into<String>, T: Into<String>>(label: L, text: T) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

impl From<&MarkdownSource> for MarkdownItem {
    fn from(source: &MarkdownSource) -> Self {
        Self {
            label: source.label.clone(),
            text: decode_normalized(&source.bytes),
        }
    }
}

pub fn provenance_comment(label: &str) -> String {
    format!("<!-- source: {} -->\n", label)
}

/// Concatenates items in the given order.
///
/// Items after the first are preceded by a blank line, `---` and another
/// blank line. With `source_comments` each item starts with a provenance
/// comment and a blank line. Every item ends with exactly the newline it
/// already had, or one is appended.
pub fn merge(items: &[MarkdownItem], source_comments: bool) -> String {
    let capacity = items
        .iter()
        .map(|item| item.text.len() + item.label.len() + 32)
        .sum();
    let mut merged = String::with_capacity(capacity);

    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            merged.push_str(SEPARATOR);
        }

        if source_comments {
            merged.push_str(&provenance_comment(&item.label));
            merged.push('\n');
        }

        merged.push_str(&item.text);
        if !item.text.ends_with('\n') {
            merged.push('\n');
        }
    }

    merged
}
