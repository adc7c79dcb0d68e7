// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Visible-window computation: margin expansion, clamping and merging.

use std::ops::Range;

/// Characters scanned on either side of each visible range so that matches
/// straddling the viewport edge are still found.
pub const DEFAULT_MARGIN: usize = 5000;

/// The document regions a highlight pass scans, sorted and disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleWindow {
    ranges: Vec<Range<usize>>,
}

impl VisibleWindow {
    /// Expands every visible range by `margin` bytes, clamps to `text`, snaps
    /// the edges outward to `char` boundaries, and merges ranges that overlap
    /// or touch. No visible ranges at all is treated as a caret at offset 0.
    pub fn around(text: &str, visible: &[Range<usize>], margin: usize) -> Self {
        let caret = [0..0];
        let visible = if visible.is_empty() { &caret[..] } else { visible };

        let mut expanded: Vec<Range<usize>> = visible
            .iter()
            .map(|range| {
                let start = range.start.min(range.end).min(text.len());
                let end = range.end.max(range.start).min(text.len());
                let start = floor_char_boundary(text, start.saturating_sub(margin));
                let end = ceil_char_boundary(text, end.saturating_add(margin).min(text.len()));
                start..end
            })
            .collect();
        expanded.sort_by_key(|range| (range.start, range.end));

        let mut ranges: Vec<Range<usize>> = Vec::with_capacity(expanded.len());
        for range in expanded {
            match ranges.last_mut() {
                Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
                _ => ranges.push(range),
            }
        }
        Self { ranges }
    }

    /// A single window covering all of `text`.
    pub fn whole(text: &str) -> Self {
        Self {
            ranges: vec![0..text.len()],
        }
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Total number of bytes covered.
    pub fn covered_len(&self) -> usize {
        self.ranges.iter().map(|r| r.end - r.start).sum()
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_is_clamped_to_document() {
        let text = "a".repeat(100);
        let window = VisibleWindow::around(&text, &[40..60], 10);
        assert_eq!(window.ranges(), &[30..70]);

        let window = VisibleWindow::around(&text, &[5..95], 10);
        assert_eq!(window.ranges(), &[0..100]);
    }

    #[test]
    fn test_overlapping_windows_merge() {
        let text = "a".repeat(100);
        let window = VisibleWindow::around(&text, &[50..55, 10..20, 30..35], 5);
        assert_eq!(window.ranges(), &[5..40, 45..60]);
        assert_eq!(window.covered_len(), 50);
    }

    #[test]
    fn test_no_visible_ranges_scans_document_head() {
        let text = "a".repeat(100);
        let window = VisibleWindow::around(&text, &[], 10);
        assert_eq!(window.ranges(), &[0..10]);
    }

    #[test]
    fn test_edges_snap_to_char_boundaries() {
        let text = "ääää";
        // 3 falls inside the second `ä` (bytes 2..4).
        let window = VisibleWindow::around(text, &[3..3], 0);
        assert_eq!(window.ranges(), &[2..4]);
    }

    #[test]
    fn test_ranges_past_end_are_clamped() {
        let window = VisibleWindow::around("abc", &[10..20], 1);
        assert_eq!(window.ranges(), &[2..3]);
    }
}
