// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Highlight passes over the visible part of a document.
//!
//! A pass ([`HighlightEngine::recompute`]) is a pure function of the document,
//! the rule snapshot, the preview and the visible ranges. Publishing a pass
//! ([`StyleTable::publish`]) pushes it to the host, creating rule styles on
//! first use and disposing styles whose rule no longer exists.

use std::collections::BTreeMap;
use std::ops::Range;

use tracing::{debug, info, trace};

use crate::config::EngineConfig;
use crate::error::RuleError;
use crate::highlight::metrics::PassSummary;
use crate::highlight::palette::{DecorationStyle, Palette, StyleId};
use crate::highlight::scanner::{MatchScanner, MatchSource, MatchSpan};
use crate::highlight::window::VisibleWindow;
use crate::notice::Notice;
use crate::rules::{PreviewPattern, ReplaceRule};

/// One style's complete set of decorations, replacing whatever the host
/// showed for that style before.
#[derive(Debug, Clone, Copy)]
pub struct DecorationBatch<'a> {
    pub style: &'a DecorationStyle,
    /// Hover text shown over every span of this batch
    pub hover: &'a str,
    pub spans: &'a [MatchSpan],
}

/// Receives decorations. Implemented by the host editor.
pub trait DecorationSink {
    fn render_decorations(&mut self, batch: DecorationBatch<'_>);

    /// Releases a style that will not be rendered again.
    fn dispose_style(&mut self, style: StyleId);
}

/// The output of one highlight pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightResult {
    /// Spans per style, in document order. Every rule that was scanned has an
    /// entry, even when it matched nothing.
    pub spans: BTreeMap<StyleId, Vec<MatchSpan>>,
    /// Hover label per style
    pub labels: BTreeMap<StyleId, String>,
    pub notices: Vec<Notice>,
    /// Why the preview was not scanned. Left to the caller to report, since
    /// it only needs saying once per preview.
    pub preview_error: Option<RuleError>,
    pub summary: PassSummary,
}

impl HighlightResult {
    pub fn spans_for(&self, style: StyleId) -> &[MatchSpan] {
        self.spans.get(&style).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn span_count(&self) -> usize {
        self.spans.values().map(Vec::len).sum()
    }
}

/// Computes highlight passes.
#[derive(Debug, Clone)]
pub struct HighlightEngine {
    margin: usize,
    preview_limit: usize,
    rule_limit: usize,
}

impl Default for HighlightEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl HighlightEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            margin: config.margin,
            preview_limit: config.preview_match_limit,
            rule_limit: config.rule_limit(),
        }
    }

    /// Runs every active rule and the preview over the windows around
    /// `visible`.
    pub fn recompute(
        &self,
        document: &str,
        rules: &[ReplaceRule],
        preview: Option<&PreviewPattern>,
        visible: &[Range<usize>],
    ) -> HighlightResult {
        let window = VisibleWindow::around(document, visible, self.margin);
        let mut result = HighlightResult::default();
        result.summary.window_len = window.covered_len();

        for (index, rule) in rules.iter().enumerate() {
            if !rule.is_active() {
                continue;
            }
            let scanner = match MatchScanner::compile(&rule.find, &rule.flags) {
                Ok(scanner) => scanner,
                Err(err) => {
                    debug!(rule = index, %err, "skipping rule with invalid pattern");
                    result.summary.invalid_rules += 1;
                    continue;
                }
            };

            let (spans, truncated) = scan_windows(
                &scanner,
                document,
                &window,
                self.rule_limit,
                false,
                MatchSource::Rule(index),
            );
            trace!(rule = index, spans = spans.len(), truncated, "rule scanned");

            let style = StyleId::Rule(index);
            result.summary.rules_scanned += 1;
            result.summary.spans += spans.len();
            result.spans.insert(style, spans);
            result
                .labels
                .insert(style, format!("Rule #{}: /{}/", index + 1, rule.find));
        }

        if let Some(preview) = preview.filter(|p| !p.find.is_empty()) {
            self.preview_pass(document, &window, preview, &mut result);
        }

        result
    }

    fn preview_pass(
        &self,
        document: &str,
        window: &VisibleWindow,
        preview: &PreviewPattern,
        result: &mut HighlightResult,
    ) {
        let scanner = match MatchScanner::compile(&preview.find, &preview.flags) {
            Ok(scanner) => scanner,
            Err(err) => {
                debug!(pattern = %preview.find, %err, "invalid preview pattern");
                result.preview_error = Some(err);
                return;
            }
        };

        let (spans, truncated) = scan_windows(
            &scanner,
            document,
            window,
            self.preview_limit,
            true,
            MatchSource::Preview,
        );
        if truncated {
            info!(limit = self.preview_limit, "preview highlighting truncated");
            result.notices.push(Notice::info(format!(
                "Too many matches; only the first {} are highlighted.",
                self.preview_limit
            )));
        }

        result.summary.preview_truncated = truncated;
        result.summary.spans += spans.len();
        result.spans.insert(StyleId::Preview, spans);
        result
            .labels
            .insert(StyleId::Preview, format!("Preview: /{}/", preview.find));
    }
}

/// Scans each window in order, sharing one match budget across all of them.
/// Windows are searched inside the whole document so that anchors behave as
/// they do for a batch replace.
/// Returns the spans and whether a match beyond the budget exists.
fn scan_windows(
    scanner: &MatchScanner,
    document: &str,
    window: &VisibleWindow,
    limit: usize,
    skip_empty: bool,
    source: MatchSource,
) -> (Vec<MatchSpan>, bool) {
    let mut spans = Vec::new();
    let mut remaining = limit;

    for range in window.ranges() {
        let (found, truncated) = scanner
            .scan_range(document, range.clone(), remaining)
            .tagged(source)
            .skip_empty(skip_empty)
            .collect_spans();
        remaining -= found.len();
        spans.extend(found);
        if truncated {
            return (spans, true);
        }
    }
    (spans, false)
}

/// Styles currently known to the host, keyed by rule position.
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    rules: BTreeMap<usize, DecorationStyle>,
    preview: Option<DecorationStyle>,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live styles, the preview style included.
    pub fn len(&self) -> usize {
        self.rules.len() + usize::from(self.preview.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, style: StyleId) -> bool {
        match style {
            StyleId::Rule(index) => self.rules.contains_key(&index),
            StyleId::Preview => self.preview.is_some(),
        }
    }

    /// Pushes `result` to `sink`, replacing the previous pass entirely.
    ///
    /// Styles of rules at or beyond `rule_count` are disposed. Rules that
    /// still exist but were not scanned this time (disabled, invalid) have
    /// their decorations cleared. The preview style is disposed once the
    /// pass has no preview.
    pub fn publish(
        &mut self,
        result: &HighlightResult,
        rule_count: usize,
        palette: &Palette,
        sink: &mut impl DecorationSink,
    ) {
        let stale = self.rules.split_off(&rule_count);
        for index in stale.into_keys() {
            debug!(rule = index, "disposing style of removed rule");
            sink.dispose_style(StyleId::Rule(index));
        }

        for index in 0..rule_count {
            let id = StyleId::Rule(index);
            match result.spans.get(&id) {
                Some(spans) => {
                    let style = self
                        .rules
                        .entry(index)
                        .or_insert_with(|| palette.rule_style(index));
                    sink.render_decorations(DecorationBatch {
                        style: &*style,
                        hover: label(result, id),
                        spans,
                    });
                }
                None => {
                    if let Some(style) = self.rules.get(&index) {
                        sink.render_decorations(DecorationBatch {
                            style,
                            hover: "",
                            spans: &[],
                        });
                    }
                }
            }
        }

        match result.spans.get(&StyleId::Preview) {
            Some(spans) => {
                let style = self.preview.get_or_insert_with(|| palette.preview_style());
                sink.render_decorations(DecorationBatch {
                    style: &*style,
                    hover: label(result, StyleId::Preview),
                    spans,
                });
            }
            None => {
                if self.preview.take().is_some() {
                    sink.dispose_style(StyleId::Preview);
                }
            }
        }
    }

    /// Disposes every style, leaving the table empty.
    pub fn dispose_all(&mut self, sink: &mut impl DecorationSink) {
        for index in std::mem::take(&mut self.rules).into_keys() {
            sink.dispose_style(StyleId::Rule(index));
        }
        if self.preview.take().is_some() {
            sink.dispose_style(StyleId::Preview);
        }
    }
}

fn label(result: &HighlightResult, style: StyleId) -> &str {
    result.labels.get(&style).map(String::as_str).unwrap_or("")
}
