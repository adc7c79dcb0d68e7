// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Lazy, capped, zero-length-safe regex match scanning.
//!
//! [`Matches`] walks a text left to right with an explicit cursor instead of
//! `Regex::find_iter`, so that an empty match always moves the cursor forward
//! by exactly one character and a scan of `x*` over `"aaa"` yields one empty
//! match per position plus one at the end.

use std::ops::Range;

use regex::Regex;

use crate::error::RuleError;
use crate::rules::compile_pattern;

/// Where a span came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchSource {
    /// Position of the rule in the rule list.
    Rule(usize),
    Preview,
}

/// A single match, with offsets into the full document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    /// Byte offset where the match starts
    pub start: usize,
    /// Byte offset one past the end of the match
    pub end: usize,
    /// The matched text, equal to `document[start..end]`
    pub text: String,
    pub source: MatchSource,
}

impl MatchSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A compiled pattern ready to scan any number of texts.
#[derive(Debug, Clone)]
pub struct MatchScanner {
    regex: Regex,
}

impl MatchScanner {
    /// Compiles `pattern` with global semantics forced on.
    pub fn compile(pattern: &str, flags: &str) -> Result<Self, RuleError> {
        Ok(Self::from_regex(compile_pattern(pattern, flags)?))
    }

    pub fn from_regex(regex: Regex) -> Self {
        Self { regex }
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Starts a scan over `text` that stops after `max_matches` spans.
    pub fn scan<'t>(&self, text: &'t str, max_matches: usize) -> Matches<'t> {
        Matches {
            regex: self.regex.clone(),
            text,
            cursor: 0,
            end: text.len(),
            base: 0,
            source: MatchSource::Preview,
            max_matches,
            produced: 0,
            skip_empty: false,
            truncated: false,
            done: false,
        }
    }

    /// Like [`scan`](Self::scan), but only yields matches that start inside
    /// `range`. Anchors and word boundaries still see the text around it, and
    /// offsets stay relative to `text`.
    pub fn scan_range<'t>(
        &self,
        text: &'t str,
        range: Range<usize>,
        max_matches: usize,
    ) -> Matches<'t> {
        let mut matches = self.scan(text, max_matches);
        matches.cursor = range.start;
        matches.end = range.end.min(text.len());
        matches
    }
}

/// Compiles `pattern` and starts a scan over `text`.
pub fn scan<'t>(
    text: &'t str,
    pattern: &str,
    flags: &str,
    max_matches: usize,
) -> Result<Matches<'t>, RuleError> {
    Ok(MatchScanner::compile(pattern, flags)?.scan(text, max_matches))
}

/// Lazy sequence of matches. Finite, and consumed once.
#[derive(Debug)]
pub struct Matches<'t> {
    regex: Regex,
    text: &'t str,
    cursor: usize,
    /// Matches must start at or before this offset
    end: usize,
    base: usize,
    source: MatchSource,
    max_matches: usize,
    produced: usize,
    skip_empty: bool,
    truncated: bool,
    done: bool,
}

impl<'t> Matches<'t> {
    /// Adds `offset` to every produced span; used when `text` is a window
    /// starting at `offset` in the full document.
    pub fn rebased(mut self, offset: usize) -> Self {
        self.base = offset;
        self
    }

    /// Tags every produced span with `source`.
    pub fn tagged(mut self, source: MatchSource) -> Self {
        self.source = source;
        self
    }

    /// Drops zero-length matches instead of yielding them. Dropped matches do
    /// not count towards the cap.
    pub fn skip_empty(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }

    /// Whether the scan stopped at the cap while more matches remained.
    /// Only meaningful once the iterator has returned `None`.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Drains the scan into a vector, returning the truncation flag with it.
    pub fn collect_spans(mut self) -> (Vec<MatchSpan>, bool) {
        let spans: Vec<MatchSpan> = self.by_ref().collect();
        (spans, self.truncated)
    }

    /// Finds the next match at or after the cursor and moves the cursor past it.
    fn advance(&mut self) -> Option<(usize, usize)> {
        loop {
            if self.done || self.cursor > self.text.len() {
                self.done = true;
                return None;
            }
            let Some(m) = self.regex.find_at(self.text, self.cursor) else {
                self.done = true;
                return None;
            };
            let (start, end) = (m.start(), m.end());
            // A match at `self.end` belongs to whatever follows, unless that is
            // the end of the text.
            if start > self.end || (start == self.end && self.end < self.text.len()) {
                self.done = true;
                return None;
            }

            if start < end {
                self.cursor = end;
                return Some((start, end));
            }

            // Zero-length: force progress by one character, or stop at the end.
            match self.text[end..].chars().next() {
                Some(ch) => self.cursor = end + ch.len_utf8(),
                None => self.done = true,
            }
            if !self.skip_empty {
                return Some((start, end));
            }
        }
    }
}

impl Iterator for Matches<'_> {
    type Item = MatchSpan;

    fn next(&mut self) -> Option<MatchSpan> {
        if self.produced >= self.max_matches {
            if !self.done {
                self.truncated = self.advance().is_some();
                self.done = true;
            }
            return None;
        }

        let (start, end) = self.advance()?;
        self.produced += 1;
        Some(MatchSpan {
            start: self.base + start,
            end: self.base + end,
            text: self.text[start..end].to_string(),
            source: self.source,
        })
    }
}
