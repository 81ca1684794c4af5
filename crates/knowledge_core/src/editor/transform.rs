//! Text-transform collaborator contract and the built-in mock assistant.
//!
//! # Responsibility
//! - Define the asynchronous transform seam (`ContentTransformer`).
//! - Provide a deterministic stand-in for the AI writing assistant.
//!
//! # Invariants
//! - Transforms read only the content they are given; they never touch the
//!   live document.

use crate::model::document::EMPTY_EDITOR_CONTENT;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

static MARKUP_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static USEFULL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)usefull").expect("valid regex"));
static I_THINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)i think").expect("valid regex"));

const EMPTY_TITLE_SUGGESTION: &str = "Mastering the Unknown: A Technical Guide";
const TITLE_TOPICS: &[&str] = &[
    "Modern Web Development",
    "Future of AI",
    "Clean Code Practices",
    "System Architecture",
];
const CONCISE_MIN_CHARS: usize = 50;
const SUMMARY_LONG_THRESHOLD: usize = 200;
const SUMMARY_EXCERPT_CHARS: usize = 180;
const SUMMARY_SHORT_EXCERPT_CHARS: usize = 50;

/// Assistant actions offered in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    RewriteClearly,
    ImproveGrammar,
    MakeConcise,
    SuggestTitle,
    Summarize,
}

/// Where a transform result lands in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformTarget {
    /// Replaces the body, reconciled with concurrent edits.
    Content,
    Title,
    /// Inserted ahead of the live body; the body itself is kept as is.
    Prepend,
}

impl TransformKind {
    pub const ALL: [TransformKind; 5] = [
        Self::RewriteClearly,
        Self::ImproveGrammar,
        Self::MakeConcise,
        Self::SuggestTitle,
        Self::Summarize,
    ];

    /// Stable action id.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RewriteClearly => "clear",
            Self::ImproveGrammar => "grammar",
            Self::MakeConcise => "concise",
            Self::SuggestTitle => "title",
            Self::Summarize => "summary",
        }
    }

    /// Inverse of `as_str`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value.trim())
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::RewriteClearly => "Rewrite Clearly",
            Self::ImproveGrammar => "Improve Grammar",
            Self::MakeConcise => "Make Concise",
            Self::SuggestTitle => "Better Title",
            Self::Summarize => "Summarize",
        }
    }

    pub fn target(self) -> TransformTarget {
        match self {
            Self::SuggestTitle => TransformTarget::Title,
            Self::Summarize => TransformTarget::Prepend,
            Self::RewriteClearly | Self::ImproveGrammar | Self::MakeConcise => {
                TransformTarget::Content
            }
        }
    }

    /// Latency of the mock assistant for this action.
    pub fn mock_latency(self) -> Duration {
        match self {
            Self::RewriteClearly | Self::Summarize => Duration::from_millis(1_500),
            Self::ImproveGrammar | Self::SuggestTitle => Duration::from_millis(1_200),
            Self::MakeConcise => Duration::from_millis(1_800),
        }
    }
}

impl Display for TransformKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transform collaborator failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformError {
    pub reason: String,
}

impl TransformError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Display for TransformError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "transform failed: {}", self.reason)
    }
}

impl Error for TransformError {}

/// Asynchronous text transform (AI rewrite, summary, ...).
///
/// Runs on the single UI control thread; futures need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait ContentTransformer {
    async fn transform(&self, kind: TransformKind, content: &str) -> Result<String, TransformError>;
}

impl<T: ContentTransformer + ?Sized> ContentTransformer for &T {
    async fn transform(&self, kind: TransformKind, content: &str) -> Result<String, TransformError> {
        (**self).transform(kind, content).await
    }
}

/// Deterministic writing assistant used in demos and tests.
#[derive(Debug, Clone, Copy)]
pub struct MockTransformer {
    simulate_latency: bool,
}

impl Default for MockTransformer {
    fn default() -> Self {
        Self {
            simulate_latency: true,
        }
    }
}

impl MockTransformer {
    /// Assistant that answers after each action's mock latency.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assistant that answers immediately.
    pub fn instant() -> Self {
        Self {
            simulate_latency: false,
        }
    }

    /// Computes the transform output without any delay.
    pub fn apply(kind: TransformKind, content: &str) -> String {
        match kind {
            TransformKind::RewriteClearly => rewrite_clearly(content),
            TransformKind::ImproveGrammar => improve_grammar(content),
            TransformKind::MakeConcise => make_concise(content),
            TransformKind::SuggestTitle => suggest_title(content),
            TransformKind::Summarize => summarize(content),
        }
    }
}

impl ContentTransformer for MockTransformer {
    async fn transform(&self, kind: TransformKind, content: &str) -> Result<String, TransformError> {
        if self.simulate_latency {
            tokio::time::sleep(kind.mock_latency()).await;
        }
        Ok(Self::apply(kind, content))
    }
}

/// Removes markup tags, keeping text content.
pub fn strip_markup(content: &str) -> String {
    MARKUP_TAG_RE.replace_all(content, "").into_owned()
}

fn is_blank_editor(content: &str) -> bool {
    content.is_empty() || content == EMPTY_EDITOR_CONTENT
}

fn take_chars(value: &str, count: usize) -> String {
    value.chars().take(count).collect()
}

fn rewrite_clearly(content: &str) -> String {
    if is_blank_editor(content) {
        return content.to_string();
    }
    format!(
        r#"<div class="ai-improved-clear">{}</div><p><em>[Rewritten for clarity]</em></p>"#,
        content.replace(". ", ". <br/><br/>")
    )
}

fn improve_grammar(content: &str) -> String {
    if is_blank_editor(content) {
        return content.to_string();
    }
    let fixed = USEFULL_RE.replace_all(content, "useful");
    I_THINK_RE
        .replace_all(&fixed, "it is evident that")
        .into_owned()
}

fn make_concise(content: &str) -> String {
    let plain = strip_markup(content);
    let length = plain.chars().count();
    if length < CONCISE_MIN_CHARS {
        return content.to_string();
    }
    format!(
        "<p>{}...</p><p><em>[Condensed for conciseness]</em></p>",
        take_chars(plain.as_str(), length / 2)
    )
}

fn suggest_title(content: &str) -> String {
    let plain = strip_markup(content);
    let plain = plain.trim();
    if plain.is_empty() {
        return EMPTY_TITLE_SUGGESTION.to_string();
    }
    let seed = plain
        .bytes()
        .fold(0usize, |acc, byte| acc.wrapping_add(usize::from(byte)));
    format!("AI Suggestion: {}", TITLE_TOPICS[seed % TITLE_TOPICS.len()])
}

fn summarize(content: &str) -> String {
    let plain = strip_markup(content);
    let plain = plain.trim();
    if plain.is_empty() {
        return "<p><strong>AI Summary:</strong> No content to summarize yet.</p>".to_string();
    }
    let summary = if plain.chars().count() > SUMMARY_LONG_THRESHOLD {
        format!("{}...", take_chars(plain, SUMMARY_EXCERPT_CHARS))
    } else {
        format!(
            "This technical article explores {} in depth.",
            take_chars(plain, SUMMARY_SHORT_EXCERPT_CHARS)
        )
    };
    format!(r#"<div class="ai-summary"><strong>AI SUMMARY</strong><br/>{summary}</div>"#)
}

#[cfg(test)]
mod tests {
    use super::{strip_markup, MockTransformer, TransformKind, TransformTarget};

    #[test]
    fn rewrite_splits_sentences_and_keeps_blank_editor() {
        let rewritten = MockTransformer::apply(TransformKind::RewriteClearly, "<p>One. Two.</p>");
        assert!(rewritten.starts_with(r#"<div class="ai-improved-clear"><p>One. <br/><br/>Two.</p>"#));
        assert!(rewritten.ends_with("[Rewritten for clarity]</em></p>"));
        assert_eq!(
            MockTransformer::apply(TransformKind::RewriteClearly, "<p><br></p>"),
            "<p><br></p>"
        );
    }

    #[test]
    fn grammar_fix_is_case_insensitive() {
        let fixed = MockTransformer::apply(TransformKind::ImproveGrammar, "<p>I think this is Usefull</p>");
        assert_eq!(fixed, "<p>it is evident that this is useful</p>");
    }

    #[test]
    fn concise_keeps_short_content_and_halves_long_content() {
        assert_eq!(MockTransformer::apply(TransformKind::MakeConcise, "<p>short</p>"), "<p>short</p>");
        let long = format!("<p>{}</p>", "a".repeat(60));
        let concise = MockTransformer::apply(TransformKind::MakeConcise, &long);
        assert_eq!(
            concise,
            format!("<p>{}...</p><p><em>[Condensed for conciseness]</em></p>", "a".repeat(30))
        );
    }

    #[test]
    fn title_suggestion_is_deterministic() {
        assert_eq!(
            MockTransformer::apply(TransformKind::SuggestTitle, "<p> </p>"),
            "Mastering the Unknown: A Technical Guide"
        );
        let first = MockTransformer::apply(TransformKind::SuggestTitle, "<p>Lifetimes</p>");
        let second = MockTransformer::apply(TransformKind::SuggestTitle, "<p>Lifetimes</p>");
        assert_eq!(first, second);
        assert!(first.starts_with("AI Suggestion: "));
        assert_eq!(TransformKind::SuggestTitle.target(), TransformTarget::Title);
        assert_eq!(TransformKind::Summarize.target(), TransformTarget::Prepend);
    }

    #[test]
    fn summary_uses_short_or_long_excerpt() {
        let short = MockTransformer::apply(TransformKind::Summarize, "<p>Traits</p>");
        assert!(short.contains("This technical article explores Traits in depth."));
        let long = MockTransformer::apply(TransformKind::Summarize, &"b".repeat(250));
        assert!(long.contains(&format!("{}...", "b".repeat(180))));
        let empty = MockTransformer::apply(TransformKind::Summarize, "");
        assert!(empty.contains("No content to summarize yet."));
    }

    #[test]
    fn parse_accepts_action_ids_only() {
        for kind in TransformKind::ALL {
            assert_eq!(TransformKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(TransformKind::parse("Better Title"), None);
        assert_eq!(TransformKind::SuggestTitle.target(), TransformTarget::Title);
    }

    #[test]
    fn strip_markup_removes_tags() {
        assert_eq!(strip_markup("<p>a <b>b</b></p>"), "a b");
    }

    #[tokio::test(start_paused = true)]
    async fn mock_latency_elapses_on_paused_clock() {
        use super::ContentTransformer;
        let output = MockTransformer::new()
            .transform(TransformKind::ImproveGrammar, "i think")
            .await
            .expect("mock transform never fails");
        assert_eq!(output, "it is evident that");
    }
}
