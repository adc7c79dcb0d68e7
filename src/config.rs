// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! wants to change.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::highlight::palette::{DEFAULT_PALETTE, Palette, Rgba};
use crate::highlight::window::DEFAULT_MARGIN;

/// Maximum number of preview highlights per pass.
pub const DEFAULT_PREVIEW_MATCH_LIMIT: usize = 500;

/// Quiet period after the last edit before highlights are recomputed.
pub const DEFAULT_EDIT_QUIET_PERIOD: Duration = Duration::from_millis(3000);

/// Delay between the last preview keystroke and the preview pass.
pub const DEFAULT_PREVIEW_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bytes scanned beyond each edge of every visible range
    pub margin: usize,
    /// Cap on preview highlights, summed over all windows
    pub preview_match_limit: usize,
    /// Optional cap on highlights per rule (unlimited when absent)
    pub rule_match_limit: Option<usize>,
    pub edit_quiet_period_ms: u64,
    pub preview_debounce_ms: u64,
    /// Rule highlight colours, cycled by rule position
    pub palette: Vec<Rgba>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            preview_match_limit: DEFAULT_PREVIEW_MATCH_LIMIT,
            rule_match_limit: None,
            edit_quiet_period_ms: DEFAULT_EDIT_QUIET_PERIOD.as_millis() as u64,
            preview_debounce_ms: DEFAULT_PREVIEW_DEBOUNCE.as_millis() as u64,
            palette: DEFAULT_PALETTE.clone(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn edit_quiet_period(&self) -> Duration {
        Duration::from_millis(self.edit_quiet_period_ms)
    }

    pub fn preview_debounce(&self) -> Duration {
        Duration::from_millis(self.preview_debounce_ms)
    }

    pub fn rule_limit(&self) -> usize {
        self.rule_match_limit.unwrap_or(usize::MAX)
    }

    pub fn palette(&self) -> Palette {
        Palette::new(self.palette.clone())
    }
}
