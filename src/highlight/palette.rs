// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Maps rules to decoration styles.
//!
//! Rule `i` always gets `palette[i % palette.len()]`, so a rule keeps its
//! colour for as long as it keeps its position. Preview matches use a single
//! fixed, more prominent style.

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// An RGBA colour with a fractional alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// The same colour at full opacity.
    pub const fn opaque(self) -> Self {
        Self { a: 1.0, ..self }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Identifies one decoration style on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleId {
    /// Style owned by the rule at this position.
    Rule(usize),
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderKind {
    Solid,
    Dashed,
}

/// What the host needs to draw a highlight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorationStyle {
    pub id: StyleId,
    pub background: Rgba,
    pub border: Rgba,
    pub border_kind: BorderKind,
}

/// Rule highlight colours, cycled by rule position.
pub static DEFAULT_PALETTE: Lazy<Vec<Rgba>> = Lazy::new(|| {
    vec![
        Rgba::new(255, 215, 0, 0.3),
        Rgba::new(135, 206, 235, 0.3),
        Rgba::new(144, 238, 144, 0.3),
        Rgba::new(255, 182, 193, 0.3),
        Rgba::new(255, 165, 0, 0.3),
        Rgba::new(173, 216, 230, 0.3),
    ]
});

/// Style reserved for the preview pattern.
pub static PREVIEW_STYLE: Lazy<DecorationStyle> = Lazy::new(|| DecorationStyle {
    id: StyleId::Preview,
    background: Rgba::new(255, 235, 59, 0.35),
    border: Rgba::new(255, 193, 7, 0.9),
    border_kind: BorderKind::Dashed,
});

/// Assigns decoration styles to rule positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Rgba>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE.clone())
    }
}

impl Palette {
    /// Creates a palette; an empty colour list falls back to the default.
    pub fn new(colors: Vec<Rgba>) -> Self {
        if colors.is_empty() {
            return Self {
                colors: DEFAULT_PALETTE.clone(),
            };
        }
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The style for the rule at `index`.
    pub fn rule_style(&self, index: usize) -> DecorationStyle {
        let color = self.colors[index % self.colors.len()];
        DecorationStyle {
            id: StyleId::Rule(index),
            background: color,
            border: color.opaque(),
            border_kind: BorderKind::Solid,
        }
    }

    pub fn preview_style(&self) -> DecorationStyle {
        *PREVIEW_STYLE
    }

    pub fn style(&self, id: StyleId) -> DecorationStyle {
        match id {
            StyleId::Rule(index) => self.rule_style(index),
            StyleId::Preview => self.preview_style(),
        }
    }
}
