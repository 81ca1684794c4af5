//! Reconciliation of a transform result with concurrent user edits.
//!
//! # Responsibility
//! - Decide the content to install when an asynchronous transform finishes
//!   while the user kept editing.
//!
//! # Invariants
//! - No edit is ever dropped: either the edit is a pure append and is
//!   re-attached after the result, or the whole live content is kept
//!   verbatim behind a visible marker (`degraded`).
//! - Edits touching both head and tail of the document always degrade. This
//!   is a last-writer-wins-with-preservation heuristic, not OT/CRDT.

/// Block-closing marker the editor auto-appends to paragraphs.
pub const BLOCK_CLOSE_MARKER: &str = "</p>";

/// Visible marker inserted between the result and preserved live content.
pub const EDITS_PRESERVED_MARKER: &str = r#"<p><small style="color: #666">[Edits preserved]</small></p>"#;

/// Content to install plus whether a clean merge was possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub content: String,
    /// `true` when the live content was preserved by concatenation and the
    /// user must review it manually.
    pub degraded: bool,
}

/// Merges `result` (computed from `baseline`) with the current `live` content.
pub fn merge(baseline: &str, result: &str, live: &str) -> MergeResult {
    if live == baseline {
        return MergeResult {
            content: result.to_string(),
            degraded: false,
        };
    }

    let trimmed_baseline = trim_block_close(baseline);
    if let Some(appended) = live.strip_prefix(trimmed_baseline) {
        return MergeResult {
            content: format!("{result}{appended}"),
            degraded: false,
        };
    }

    MergeResult {
        content: format!("{result}{EDITS_PRESERVED_MARKER}{live}"),
        degraded: true,
    }
}

/// Removes one trailing block-closing marker, if present.
pub fn trim_block_close(content: &str) -> &str {
    content.strip_suffix(BLOCK_CLOSE_MARKER).unwrap_or(content)
}
