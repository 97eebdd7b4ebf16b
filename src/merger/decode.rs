//! Text decoding for merged sources.
//!
//! | Step | Encoding                         | On failure         |
//! |------|----------------------------------|--------------------|
//! | 1    | UTF-8, strict, BOM kept as text  | go to step 2       |
//! | 2    | Shift_JIS (Windows code page 932)| cannot fail        |
//!
//! Step 2 maps byte sequences it cannot decode to U+FFFD.

use encoding_rs::SHIFT_JIS;

/// Decodes raw bytes into text. Never fails.
pub fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, had_errors) = SHIFT_JIS.decode_without_bom_handling(bytes);
            if had_errors {
                tracing::debug!("Shift_JIS fallback replaced undecodable bytes");
            }
            text.into_owned()
        }
    }
}

/// Rewrites `\r\n` and lone `\r` as `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// [`decode`] followed by [`normalize_newlines`].
pub fn decode_normalized(bytes: &[u8]) -> String {
    normalize_newlines(&decode(bytes))
}
