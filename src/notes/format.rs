//! Output cleaning and document framing.

use std::sync::OnceLock;

use regex::Regex;

static THINK_TAGS: OnceLock<Regex> = OnceLock::new();

/// Removes `<think>...</think>` blocks from model output.
///
/// Reasoning models sometimes emit their scratchpad inside think tags;
/// those must never reach the written document. Matching is
/// case-insensitive and spans newlines, non-greedily, so separate blocks
/// are removed individually. An unclosed tag is left untouched.
pub fn strip_think_tags(text: &str) -> String {
    let re =
        THINK_TAGS.get_or_init(|| Regex::new(r"(?is)<think>.*?</think>").expect("Invalid regex"));
    re.replace_all(text, "").into_owned()
}

/// Frames a cleaned notes body as the final document for one lecture.
pub fn render_document(base_name: &str, body: &str) -> String {
    format!("\n\n## Notes for {}\n\n{}\n\n---\n", base_name, body)
}
