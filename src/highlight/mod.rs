// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Match highlighting infrastructure.
//!
//! This module provides the match scanner, the windowed highlight engine,
//! style assignment, and the timers that decide when a pass runs.

pub mod engine;
pub mod metrics;
pub mod palette;
pub mod scanner;
pub mod schedule;
pub mod window;

pub use engine::{DecorationBatch, DecorationSink, HighlightEngine, HighlightResult, StyleTable};
pub use metrics::{HighlightMetrics, PassSummary};
pub use palette::{BorderKind, DecorationStyle, Palette, Rgba, StyleId};
pub use scanner::{MatchScanner, MatchSource, MatchSpan, Matches, scan};
pub use schedule::{Debounce, Throttle};
pub use window::{DEFAULT_MARGIN, VisibleWindow};
