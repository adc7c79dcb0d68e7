// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Drives a `DocumentSession` through a recording host.

use std::ops::Range;
use std::thread;
use std::time::{Duration, Instant};

use replace_rules::highlight::{DecorationBatch, DecorationSink};
use replace_rules::{
    DocumentHost, DocumentSession, EngineConfig, MatchSpan, NoticeKind, PreviewPattern,
    ReplaceError, ReplaceRule, RuleEdit, RuleStore, SessionEvent, StyleId,
};

#[derive(Debug, Default)]
struct FakeHost {
    text: Option<String>,
    visible: Vec<Range<usize>>,
    rendered: Vec<(StyleId, Vec<MatchSpan>)>,
    disposed: Vec<StyleId>,
    notices: Vec<(NoticeKind, String)>,
    writes: Vec<String>,
}

impl FakeHost {
    fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            visible: vec![0..text.len()],
            ..Self::default()
        }
    }

    fn latest(&self, style: StyleId) -> Option<&[MatchSpan]> {
        self.rendered
            .iter()
            .rev()
            .find(|(id, _)| *id == style)
            .map(|(_, spans)| spans.as_slice())
    }

    fn renders_of(&self, style: StyleId) -> usize {
        self.rendered.iter().filter(|(id, _)| *id == style).count()
    }
}

impl DecorationSink for FakeHost {
    fn render_decorations(&mut self, batch: DecorationBatch<'_>) {
        self.rendered.push((batch.style.id, batch.spans.to_vec()));
    }

    fn dispose_style(&mut self, style: StyleId) {
        self.disposed.push(style);
    }
}

impl DocumentHost for FakeHost {
    fn document_text(&self) -> Option<String> {
        self.text.clone()
    }

    fn visible_ranges(&self) -> Vec<Range<usize>> {
        self.visible.clone()
    }

    fn notify(&mut self, kind: NoticeKind, message: &str) {
        self.notices.push((kind, message.to_string()));
    }

    fn write_document(&mut self, text: String) {
        self.text = Some(text.clone());
        self.writes.push(text);
    }
}

fn store(rules: Vec<ReplaceRule>) -> RuleStore {
    RuleStore::with_rules(rules)
}

fn attach(text: &str, rules: Vec<ReplaceRule>) -> DocumentSession<FakeHost, RuleStore> {
    DocumentSession::attach(FakeHost::with_text(text), store(rules), EngineConfig::default())
}

#[test]
fn test_attach_highlights_immediately() {
    let session = attach("banana", vec![ReplaceRule::new("an", "")]);
    let spans = session.host().latest(StyleId::Rule(0)).unwrap();
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].start, 1);
    assert_eq!(session.metrics().passes, 1);
}

#[test]
fn test_document_text_window() {
    let host = FakeHost::with_text("héllo");
    assert_eq!(host.document_text_window(0..1).as_deref(), Some("h"));
    assert_eq!(host.document_text_window(1..3).as_deref(), Some("é"));
    assert_eq!(host.document_text_window(1..2), None);
    assert_eq!(host.document_text_window(4..99), None);
    assert_eq!(FakeHost::default().document_text_window(0..0), None);
}

#[test]
fn test_document_edits_are_throttled() {
    let mut session = attach("abc", vec![ReplaceRule::new("a", "")]);
    let t0 = Instant::now();

    session.on_document_changed(t0);
    session.on_document_changed(t0 + Duration::from_secs(1));
    assert_eq!(session.next_deadline(), Some(t0 + Duration::from_secs(4)));

    assert!(!session.tick(t0 + Duration::from_millis(3500)));
    assert_eq!(session.metrics().passes, 1);

    assert!(session.tick(t0 + Duration::from_secs(4)));
    assert_eq!(session.metrics().passes, 2);
    assert_eq!(session.next_deadline(), None);
}

#[test]
fn test_immediate_trigger_supersedes_pending_recompute() {
    let mut session = attach("abc", vec![ReplaceRule::new("a", "")]);
    let t0 = Instant::now();

    session.on_document_changed(t0);
    session.on_visible_ranges_changed();
    assert_eq!(session.metrics().passes, 2);
    assert_eq!(session.next_deadline(), None);
    assert!(!session.tick(t0 + Duration::from_secs(10)));
}

#[test]
fn test_preview_input_is_debounced() {
    let mut session = attach("abcabc", vec![]);
    let t0 = Instant::now();
    let ms = Duration::from_millis(1);

    session.on_preview_input(Some(PreviewPattern::new("a", "g")), t0);
    session.on_preview_input(Some(PreviewPattern::new("ab", "g")), t0 + 50 * ms);
    session.on_preview_input(Some(PreviewPattern::new("abc", "g")), t0 + 100 * ms);

    assert!(!session.tick(t0 + 200 * ms));
    assert_eq!(session.host().renders_of(StyleId::Preview), 0);

    assert!(session.tick(t0 + 250 * ms));
    let spans = session.host().latest(StyleId::Preview).unwrap();
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].text, "abc");
    assert_eq!(session.host().renders_of(StyleId::Preview), 1);

    // Clearing the preview releases its style.
    session.on_preview_input(None, t0 + 300 * ms);
    session.tick(t0 + 500 * ms);
    assert_eq!(session.host().disposed, vec![StyleId::Preview]);
}

#[test]
fn test_invalid_preview_notifies_and_keeps_rules() {
    let mut session = attach("banana", vec![ReplaceRule::new("a", "")]);
    session.set_preview(Some(PreviewPattern::new("(", "g")));

    let host = session.host();
    assert_eq!(host.latest(StyleId::Rule(0)).unwrap().len(), 3);
    assert_eq!(host.renders_of(StyleId::Preview), 0);
    assert_eq!(host.notices.len(), 1);
    assert_eq!(host.notices[0].0, NoticeKind::Warning);
}

#[test]
fn test_invalid_preview_is_reported_once() {
    let mut session = attach("banana", vec![ReplaceRule::new("a", "")]);
    let warnings = |session: &DocumentSession<FakeHost, RuleStore>| {
        session
            .host()
            .notices
            .iter()
            .filter(|(kind, _)| *kind == NoticeKind::Warning)
            .count()
    };

    session.set_preview(Some(PreviewPattern::new("(", "g")));
    session.on_visible_ranges_changed();
    session.on_visible_ranges_changed();
    assert_eq!(warnings(&session), 1);

    // A different invalid pattern is worth a new warning.
    session.set_preview(Some(PreviewPattern::new("[", "g")));
    session.on_visible_ranges_changed();
    assert_eq!(warnings(&session), 2);

    // After a valid preview, the old mistake is reported again.
    session.set_preview(Some(PreviewPattern::new("n", "g")));
    session.set_preview(Some(PreviewPattern::new("[", "g")));
    assert_eq!(warnings(&session), 3);
}

#[test]
fn test_pattern_input_is_parsed() {
    let mut session = attach("Banana", vec![]);
    let t0 = Instant::now();

    session.on_pattern_input("/b/i", t0);
    session.tick(t0 + Duration::from_secs(1));
    let spans = session.host().latest(StyleId::Preview).unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].text, "B");

    // Blank input clears the preview.
    session.on_pattern_input("   ", t0 + Duration::from_secs(2));
    session.tick(t0 + Duration::from_secs(3));
    assert_eq!(session.host().disposed, vec![StyleId::Preview]);
}

#[test]
fn test_truncated_preview_notifies() {
    let config = EngineConfig {
        preview_match_limit: 2,
        ..EngineConfig::default()
    };
    let mut session = DocumentSession::attach(FakeHost::with_text("aaaa"), RuleStore::new(), config);
    session.set_preview(Some(PreviewPattern::new("a", "g")));

    let host = session.host();
    assert_eq!(host.latest(StyleId::Preview).unwrap().len(), 2);
    assert_eq!(host.notices.len(), 1);
    assert_eq!(host.notices[0].0, NoticeKind::Info);
    assert!(session.metrics().truncated_previews >= 1);
}

#[test]
fn test_rule_edits_rehighlight_and_dispose_styles() {
    let mut session = attach(
        "abc",
        vec![ReplaceRule::new("a", ""), ReplaceRule::new("b", "")],
    );
    assert_eq!(session.styles().len(), 2);

    session.edit_rules(RuleEdit::Delete(0)).unwrap();
    assert_eq!(session.host().disposed, vec![StyleId::Rule(1)]);
    // What was rule 1 now renders under rule 0's style.
    assert_eq!(session.host().latest(StyleId::Rule(0)).unwrap()[0].text, "b");

    let err = session.edit_rules(RuleEdit::Add(ReplaceRule::new("(", "")));
    assert!(err.is_err());
    assert_eq!(session.rules().len(), 1);
    assert_eq!(session.host().notices.last().unwrap().0, NoticeKind::Error);
}

#[test]
fn test_batch_replace_cascades_and_writes_once() {
    let mut session = attach(
        "a a",
        vec![ReplaceRule::new("a", "b"), ReplaceRule::new("b", "c")],
    );
    assert_eq!(session.apply_batch_replace(), Ok(2));

    let host = session.host();
    assert_eq!(host.writes, vec!["c c".to_string()]);
    assert_eq!(host.notices.last().unwrap().0, NoticeKind::Info);
}

#[test]
fn test_batch_replace_is_all_or_nothing() {
    let mut session = attach(
        "a",
        vec![ReplaceRule::new("a", "b"), ReplaceRule::new("(", "c")],
    );
    let err = session.apply_batch_replace().unwrap_err();
    assert_eq!(err.rule_index(), Some(1));

    let host = session.host();
    assert!(host.writes.is_empty());
    assert_eq!(host.text.as_deref(), Some("a"));
    let (kind, message) = host.notices.last().unwrap();
    assert_eq!(*kind, NoticeKind::Error);
    assert!(message.contains("rule #2"), "{message}");
}

#[test]
fn test_batch_replace_warnings() {
    let mut session = attach("a", vec![]);
    assert_eq!(session.apply_batch_replace(), Err(ReplaceError::EmptyRuleSet));
    assert_eq!(session.host().notices.last().unwrap().0, NoticeKind::Warning);

    let mut session = DocumentSession::attach(
        FakeHost::default(),
        store(vec![ReplaceRule::new("a", "b")]),
        EngineConfig::default(),
    );
    assert_eq!(session.apply_batch_replace(), Err(ReplaceError::NoActiveDocument));
    assert_eq!(session.host().notices.last().unwrap().0, NoticeKind::Warning);
    assert!(session.host().rendered.is_empty());
}

#[test]
fn test_disabled_rules_do_not_write() {
    let mut session = attach("a", vec![ReplaceRule::new("a", "X").disabled()]);
    assert_eq!(session.apply_batch_replace(), Ok(0));
    assert!(session.host().writes.is_empty());
    assert_eq!(session.host().text.as_deref(), Some("a"));
}

#[test]
fn test_detach_disposes_every_style() {
    let mut session = attach("ab", vec![ReplaceRule::new("a", ""), ReplaceRule::new("b", "")]);
    session.set_preview(Some(PreviewPattern::new("b", "")));
    let (host, rules) = session.detach();

    assert_eq!(
        host.disposed,
        vec![StyleId::Rule(0), StyleId::Rule(1), StyleId::Preview]
    );
    assert_eq!(rules.len(), 2);
}

#[test]
fn test_event_loop_dispatches_and_detaches() {
    let config = EngineConfig {
        edit_quiet_period_ms: 10,
        ..EngineConfig::default()
    };
    let session = DocumentSession::attach(
        FakeHost::with_text("one two"),
        store(vec![ReplaceRule::new("o", "0")]),
        config,
    );
    let (tx, rx) = crossbeam_channel::unbounded();
    let worker = thread::spawn(move || replace_rules::session::run(session, rx));

    tx.send(SessionEvent::EditRules(RuleEdit::Add(ReplaceRule::new("t", "T"))))
        .unwrap();
    tx.send(SessionEvent::ApplyBatchReplace).unwrap();
    tx.send(SessionEvent::DocumentChanged).unwrap();
    thread::sleep(Duration::from_millis(300));
    tx.send(SessionEvent::Detach).unwrap();

    let (host, rules) = worker.join().unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(host.writes, vec!["0ne Tw0".to_string()]);
    // attach, rule edit, and the throttled pass after the document change
    assert_eq!(host.renders_of(StyleId::Rule(0)), 3);
    assert_eq!(host.disposed, vec![StyleId::Rule(0), StyleId::Rule(1)]);
}
