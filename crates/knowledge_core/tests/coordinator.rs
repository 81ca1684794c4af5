use knowledge_core::editor::transform::TransformError;
use knowledge_core::{
    ActionCoordinator, ActionOutcome, ContentTransformer, CoordinatorError, CoordinatorState,
    Document, MockTransformer, SharedDocument, TransformKind,
};
use std::cell::{Cell, RefCell};
use std::time::Duration;
use tokio::sync::oneshot;

/// Transformer whose single answer is supplied by the test.
struct GatedTransformer {
    gate: RefCell<Option<oneshot::Receiver<Result<String, TransformError>>>>,
    calls: Cell<usize>,
}

impl GatedTransformer {
    fn new() -> (Self, oneshot::Sender<Result<String, TransformError>>) {
        let (sender, receiver) = oneshot::channel();
        let transformer = Self {
            gate: RefCell::new(Some(receiver)),
            calls: Cell::new(0),
        };
        (transformer, sender)
    }
}

impl ContentTransformer for GatedTransformer {
    async fn transform(&self, _kind: TransformKind, _content: &str) -> Result<String, TransformError> {
        self.calls.set(self.calls.get() + 1);
        let receiver = self.gate.borrow_mut().take();
        match receiver {
            Some(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(TransformError::new("gate dropped"))),
            None => Err(TransformError::new("gate already used")),
        }
    }
}

fn document(content: &str) -> SharedDocument {
    SharedDocument::new(Document::new("Draft title", content, "rust, async"))
}

#[tokio::test]
async fn second_submit_is_rejected_and_first_result_is_installed_once() {
    let (transformer, sender) = GatedTransformer::new();
    let coordinator = ActionCoordinator::new(transformer);
    let doc = document("<p>Hello</p>");

    let pending = coordinator
        .submit(TransformKind::RewriteClearly, &doc)
        .unwrap();
    let first_id = pending.request().id;

    let (outcome, ()) = tokio::join!(pending.resolve(), async {
        assert!(matches!(
            coordinator.submit(TransformKind::Summarize, &doc),
            Err(CoordinatorError::AlreadyInProgress {
                pending: TransformKind::RewriteClearly
            })
        ));
        sender.send(Ok("<p>HELLO</p>".to_string())).unwrap();
    });

    let outcome = outcome.unwrap();
    assert_eq!(outcome.request_id(), first_id);
    assert!(!outcome.is_degraded());
    assert_eq!(doc.content(), "<p>HELLO</p>");
    assert_eq!(coordinator.state(), CoordinatorState::Idle);
}

#[tokio::test]
async fn append_during_transform_is_reattached() {
    let (transformer, sender) = GatedTransformer::new();
    let coordinator = ActionCoordinator::new(&transformer);
    let doc = document("<p>Hello</p>");

    let pending = coordinator
        .submit(TransformKind::RewriteClearly, &doc)
        .unwrap();
    assert_eq!(pending.request().baseline_content, "<p>Hello</p>");

    let (outcome, ()) = tokio::join!(pending.resolve(), async {
        doc.set_content("<p>Hello World</p>");
        sender.send(Ok("<p>HELLO</p>".to_string())).unwrap();
    });

    match outcome.unwrap() {
        ActionOutcome::ContentMerged { merge, .. } => {
            assert!(!merge.degraded);
            assert_eq!(merge.content, "<p>HELLO</p> World</p>");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(doc.content(), "<p>HELLO</p> World</p>");
    assert_eq!(transformer.calls.get(), 1);
}

#[tokio::test]
async fn rewrite_in_the_middle_degrades_without_losing_text() {
    let (transformer, sender) = GatedTransformer::new();
    let coordinator = ActionCoordinator::new(transformer);
    let doc = document("<p>Hello</p>");

    let pending = coordinator
        .submit(TransformKind::MakeConcise, &doc)
        .unwrap();
    let (outcome, ()) = tokio::join!(pending.resolve(), async {
        doc.set_content("<p>Intro</p><p>Hello</p>");
        sender.send(Ok("<p>Hi</p>".to_string())).unwrap();
    });

    let outcome = outcome.unwrap();
    assert!(outcome.is_degraded());
    assert!(doc.content().starts_with("<p>Hi</p>"));
    assert!(doc.content().ends_with("<p>Intro</p><p>Hello</p>"));
}

#[tokio::test]
async fn failed_transform_leaves_document_untouched_and_coordinator_idle() {
    let (transformer, sender) = GatedTransformer::new();
    let coordinator = ActionCoordinator::new(transformer);
    let doc = document("<p>Hello</p>");

    let pending = coordinator
        .submit(TransformKind::ImproveGrammar, &doc)
        .unwrap();
    let (outcome, ()) = tokio::join!(pending.resolve(), async {
        doc.set_content("<p>Hello again</p>");
        sender
            .send(Err(TransformError::new("assistant unavailable")))
            .unwrap();
    });

    match outcome.unwrap_err() {
        CoordinatorError::TransformFailed { kind, cause } => {
            assert_eq!(kind, TransformKind::ImproveGrammar);
            assert_eq!(cause.reason, "assistant unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(doc.content(), "<p>Hello again</p>");
    assert!(!coordinator.is_pending());
}

#[tokio::test]
async fn title_suggestion_respects_user_retitle() {
    let doc = document("<p>Some text about rust</p>");
    let coordinator = ActionCoordinator::new(MockTransformer::instant());

    let outcome = coordinator
        .run(TransformKind::SuggestTitle, &doc)
        .await
        .unwrap();
    match outcome {
        ActionOutcome::TitleSuggested {
            suggestion,
            applied,
            ..
        } => {
            assert!(applied);
            assert_eq!(doc.title(), suggestion);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(doc.content(), "<p>Some text about rust</p>");

    let (transformer, sender) = GatedTransformer::new();
    let gated = ActionCoordinator::new(transformer);
    let pending = gated.submit(TransformKind::SuggestTitle, &doc).unwrap();
    let (outcome, ()) = tokio::join!(pending.resolve(), async {
        doc.set_title("My own title");
        sender.send(Ok("Suggested".to_string())).unwrap();
    });

    let outcome = outcome.unwrap();
    assert!(outcome.is_degraded());
    assert_eq!(doc.title(), "My own title");
}

#[tokio::test(start_paused = true)]
async fn mock_assistant_merges_edit_made_during_latency() {
    let coordinator = ActionCoordinator::new(MockTransformer::new());
    let doc = document("<p>I think this is Usefull</p>");

    let pending = coordinator
        .submit(TransformKind::ImproveGrammar, &doc)
        .unwrap();
    let (outcome, ()) = tokio::join!(pending.resolve(), async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        doc.set_content("<p>I think this is Usefull and more</p>");
    });

    let outcome = outcome.unwrap();
    assert!(!outcome.is_degraded());
    assert!(doc.content().starts_with("<p>it is evident that this is useful</p>"));
    assert!(doc.content().ends_with(" and more</p>"));
    assert_eq!(coordinator.state(), CoordinatorState::Idle);
}

#[tokio::test]
async fn summary_is_inserted_ahead_of_the_body() {
    let body = format!("<p>{}</p>", "Ownership and borrowing. ".repeat(14));
    let doc = document(&body);
    let coordinator = ActionCoordinator::new(MockTransformer::instant());

    let outcome = coordinator
        .run(TransformKind::Summarize, &doc)
        .await
        .unwrap();

    let summary = match outcome {
        ActionOutcome::SummaryInserted { ref summary, .. } => summary.clone(),
        ref other => panic!("unexpected outcome: {other:?}"),
    };
    assert!(!outcome.is_degraded());
    assert!(summary.starts_with(r#"<div class="ai-summary">"#));
    assert_eq!(doc.content(), format!("{summary}{body}"));
    assert_eq!(doc.title(), "Draft title");
}

#[tokio::test]
async fn summary_keeps_edits_made_while_it_was_computed() {
    let (transformer, sender) = GatedTransformer::new();
    let coordinator = ActionCoordinator::new(transformer);
    let doc = document("<p>Hello</p>");

    let pending = coordinator.submit(TransformKind::Summarize, &doc).unwrap();
    let (outcome, ()) = tokio::join!(pending.resolve(), async {
        doc.set_content("<p>Intro</p><p>Hello</p>");
        sender.send(Ok("<div>sum</div>".to_string())).unwrap();
    });

    assert!(!outcome.unwrap().is_degraded());
    assert_eq!(doc.content(), "<div>sum</div><p>Intro</p><p>Hello</p>");
}
