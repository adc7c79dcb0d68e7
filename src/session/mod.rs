// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-document engine state and the host editor interface.
//!
//! A [`DocumentSession`] is created when a document becomes active
//! ([`DocumentSession::attach`]) and torn down when it stops being active
//! ([`DocumentSession::detach`]). It owns every piece of mutable engine state
//! for that document: the style table, the pending recompute, the pending
//! preview and the last highlight result.

pub mod events;

use std::ops::Range;
use std::time::Instant;

use tracing::{debug, info, trace, warn};

use crate::config::EngineConfig;
use crate::error::{ReplaceError, RuleError};
use crate::highlight::{
    Debounce, DecorationSink, HighlightEngine, HighlightMetrics, HighlightResult, Palette,
    StyleTable, Throttle,
};
use crate::notice::NoticeKind;
use crate::replace::{BatchReplacer, ReplaceOutcome};
use crate::rules::{PreviewPattern, ReplaceRule, RuleEdit, RuleSource};

pub use events::{SessionEvent, run};

/// What the core needs from the editor hosting a document.
pub trait DocumentHost: DecorationSink {
    /// Full text of the active document, or `None` when there is none.
    fn document_text(&self) -> Option<String>;

    /// Text of `range` only. `None` without a document, or when the range is
    /// out of bounds or splits a character.
    fn document_text_window(&self, range: Range<usize>) -> Option<String> {
        self.document_text()
            .and_then(|text| text.get(range).map(str::to_string))
    }

    /// Byte ranges currently on screen.
    fn visible_ranges(&self) -> Vec<Range<usize>>;

    /// Shows a non-fatal message to the user.
    fn notify(&mut self, kind: NoticeKind, message: &str);

    /// Replaces the whole document in a single edit.
    fn write_document(&mut self, text: String);
}

/// Engine state for one attached document.
pub struct DocumentSession<H, R> {
    host: H,
    rules: R,
    config: EngineConfig,
    engine: HighlightEngine,
    palette: Palette,
    styles: StyleTable,
    /// Pending recompute after document edits
    recompute: Throttle,
    /// Pending preview from pattern-input keystrokes
    preview_input: Debounce<Option<PreviewPattern>>,
    last_result: Option<HighlightResult>,
    /// Invalid preview the user was last warned about
    reported_preview: Option<PreviewPattern>,
    metrics: HighlightMetrics,
}

impl<H: DocumentHost, R: RuleSource> DocumentSession<H, R> {
    /// Attaches to a document and highlights it right away.
    pub fn attach(host: H, rules: R, config: EngineConfig) -> Self {
        let mut session = Self {
            host,
            rules,
            engine: HighlightEngine::new(&config),
            palette: config.palette(),
            styles: StyleTable::new(),
            recompute: Throttle::new(config.edit_quiet_period()),
            preview_input: Debounce::new(config.preview_debounce()),
            last_result: None,
            reported_preview: None,
            metrics: HighlightMetrics::default(),
            config,
        };
        debug!("document session attached");
        session.recompute_highlights();
        session
    }

    /// Releases every style and drops pending work, handing back the host and
    /// the rule source.
    pub fn detach(mut self) -> (H, R) {
        self.recompute.cancel();
        self.preview_input.cancel();
        self.styles.dispose_all(&mut self.host);
        debug!(passes = self.metrics.passes, "document session detached");
        (self.host, self.rules)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &HighlightMetrics {
        &self.metrics
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    /// The most recent highlight pass.
    pub fn last_result(&self) -> Option<&HighlightResult> {
        self.last_result.as_ref()
    }

    /// Content edits are coalesced: the pass runs once the document has been
    /// quiet for the configured period.
    pub fn on_document_changed(&mut self, now: Instant) {
        trace!("document changed, rescheduling highlight pass");
        self.recompute.schedule(now);
    }

    pub fn on_visible_ranges_changed(&mut self) {
        self.recompute_highlights();
    }

    /// Call after the rule source was changed from outside the session.
    pub fn on_rules_changed(&mut self) {
        self.recompute_highlights();
    }

    /// Applies a rule edit and re-highlights. A rejected edit is reported to
    /// the user and leaves the rules unchanged.
    pub fn edit_rules(&mut self, edit: RuleEdit) -> Result<(), RuleError> {
        if let Err(err) = self.rules.apply_edit(edit) {
            warn!(%err, "rule edit rejected");
            self.host.notify(NoticeKind::Error, &err.to_string());
            return Err(err);
        }
        self.recompute_highlights();
        Ok(())
    }

    /// A keystroke in the pattern input. The preview reaches the engine only
    /// after input has paused for the debounce interval.
    pub fn on_preview_input(&mut self, preview: Option<PreviewPattern>, now: Instant) {
        self.preview_input.push(preview, now);
    }

    /// Raw text from the pattern input, plain or `/pattern/flags`. Blank
    /// input clears the preview.
    pub fn on_pattern_input(&mut self, raw: &str, now: Instant) {
        self.on_preview_input(PreviewPattern::parse_input(raw), now);
    }

    /// Sets or clears the preview immediately.
    pub fn set_preview(&mut self, preview: Option<PreviewPattern>) {
        self.preview_input.cancel();
        self.rules.set_preview_pattern(preview);
        self.recompute_highlights();
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.recompute.deadline(), self.preview_input.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Runs whatever timers are due at `now`. Returns whether a pass ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut ran = false;
        if let Some(preview) = self.preview_input.poll(now) {
            self.set_preview(preview);
            ran = true;
        }
        if self.recompute.fire(now) {
            self.recompute_highlights();
            ran = true;
        }
        ran
    }

    /// Runs a highlight pass now, superseding any pending one.
    pub fn recompute_highlights(&mut self) {
        self.recompute.cancel();
        let Some(document) = self.host.document_text() else {
            debug!("no active document, skipping highlight pass");
            return;
        };
        let rules = self.rules.rule_snapshot();
        let preview = self.rules.preview_pattern();
        let visible = self.host.visible_ranges();

        let started = Instant::now();
        let result = self
            .engine
            .recompute(&document, &rules, preview.as_ref(), &visible);
        self.styles
            .publish(&result, rules.len(), &self.palette, &mut self.host);
        for notice in &result.notices {
            self.host.notify(notice.kind, &notice.message);
        }
        self.report_preview_error(&result, preview);

        let elapsed = started.elapsed();
        self.metrics.record_pass(elapsed, &result.summary);
        debug!(
            rules = result.summary.rules_scanned,
            invalid = result.summary.invalid_rules,
            spans = result.summary.spans,
            window = result.summary.window_len,
            elapsed_us = elapsed.as_micros() as u64,
            "highlight pass"
        );
        self.last_result = Some(result);
    }

    /// Warns about an invalid preview once, not on every pass that skips it.
    fn report_preview_error(&mut self, result: &HighlightResult, preview: Option<PreviewPattern>) {
        let (Some(err), Some(preview)) = (&result.preview_error, preview) else {
            self.reported_preview = None;
            return;
        };
        if self.reported_preview.as_ref() == Some(&preview) {
            trace!(pattern = %preview.find, "invalid preview already reported");
            return;
        }
        self.host
            .notify(NoticeKind::Warning, &format!("Invalid preview pattern: {err}"));
        self.reported_preview = Some(preview);
    }

    /// Runs every enabled rule over the document and writes the result back
    /// in one edit. Nothing is written unless every enabled rule compiles.
    /// Returns the number of rules applied.
    pub fn apply_batch_replace(&mut self) -> Result<usize, ReplaceError> {
        let rules = self.rules.rule_snapshot();
        let outcome = match self.run_batch(&rules) {
            Ok(outcome) => outcome,
            Err(err) => {
                let kind = match err {
                    ReplaceError::InvalidPattern { .. } => NoticeKind::Error,
                    ReplaceError::NoActiveDocument | ReplaceError::EmptyRuleSet => {
                        NoticeKind::Warning
                    }
                };
                warn!(%err, "batch replace not applied");
                self.host.notify(kind, &err.to_string());
                return Err(err);
            }
        };

        info!(
            applied = outcome.applied,
            replacements = outcome.replacements,
            "batch replace finished"
        );
        let applied = outcome.applied;
        let message = format!(
            "Ran {applied} rule(s), {} replacement(s).",
            outcome.replacements
        );
        if outcome.replacements > 0 {
            self.host.write_document(outcome.text);
        }
        self.host.notify(NoticeKind::Info, &message);
        Ok(applied)
    }

    fn run_batch(&self, rules: &[ReplaceRule]) -> Result<ReplaceOutcome, ReplaceError> {
        if rules.is_empty() {
            return Err(ReplaceError::EmptyRuleSet);
        }
        let document = self
            .host
            .document_text()
            .ok_or(ReplaceError::NoActiveDocument)?;
        let replacer = BatchReplacer::compile(rules)?;
        Ok(replacer.apply(&document))
    }
}
