// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Replace rules, the transient preview pattern, and regex compilation.
//!
//! Rules carry JavaScript-style flag letters (`"gi"`, `"gm"`, ...). They are
//! mapped onto [`RegexBuilder`] options here so that every other module only
//! ever sees a compiled [`Regex`].
//!
//! Pattern input typed by the user is either a plain pattern or a
//! `/pattern/flags` literal; see [`split_input`].

use std::borrow::Cow;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RuleError;

/// Flags used when a rule has none.
pub const DEFAULT_FLAGS: &str = "g";

static SLASHED_INPUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/(.*)/([A-Za-z0-9_]*)$").expect("slashed input regex is valid")
});

/// Splits pattern input into `(pattern, flags)`.
///
/// The input is trimmed first; blank input gives `None`. `/pattern/flags`
/// is unwrapped, anything else is taken as the pattern. Missing flags mean
/// [`DEFAULT_FLAGS`].
pub fn split_input(raw: &str) -> Option<(String, String)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let (pattern, flags) = match SLASHED_INPUT.captures(raw) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()),
            caps.get(2).map_or("", |m| m.as_str()),
        ),
        None => (raw, ""),
    };
    let flags = if flags.is_empty() { DEFAULT_FLAGS } else { flags };
    Some((pattern.to_string(), flags.to_string()))
}

fn default_flags() -> String {
    DEFAULT_FLAGS.to_string()
}

fn default_enabled() -> bool {
    true
}

/// Missing, `null` and empty flag strings all mean [`DEFAULT_FLAGS`].
fn flags_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let flags = Option::<String>::deserialize(deserializer)?;
    Ok(flags.filter(|f| !f.is_empty()).unwrap_or_else(default_flags))
}

fn enabled_or_default<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

/// One find/replace rule. Identity is its position in the rule list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceRule {
    /// Regex source.
    #[serde(default)]
    pub find: String,
    /// Replacement template; may reference capture groups.
    #[serde(default)]
    pub replace: String,
    /// Regex option letters.
    #[serde(default = "default_flags", deserialize_with = "flags_or_default")]
    pub flags: String,
    #[serde(default = "default_enabled", deserialize_with = "enabled_or_default")]
    pub enabled: bool,
}

impl ReplaceRule {
    /// Creates an enabled rule with the default flags.
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
            flags: default_flags(),
            enabled: true,
        }
    }

    /// Builds a rule from pattern input and a replacement template.
    pub fn from_input(raw_find: &str, replace: impl Into<String>) -> Result<Self, RuleError> {
        let (find, flags) = split_input(raw_find).ok_or(RuleError::EmptyPattern)?;
        Ok(Self::new(find, replace).with_flags(flags))
    }

    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = flags.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether the rule takes part in highlighting and replacement.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.find.is_empty()
    }

    /// Compiles the rule's pattern with global semantics forced on.
    pub fn compile(&self) -> Result<Regex, RuleError> {
        compile_pattern(&self.find, &self.flags)
    }

    /// Plain-text export of the rule, one field per line.
    pub fn to_export_text(&self) -> String {
        format!(
            "find: {}\nreplace: {}\nflags: {}",
            self.find, self.replace, self.flags
        )
    }
}

/// The pattern currently being composed, highlighted but not yet a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewPattern {
    pub find: String,
    #[serde(default = "default_flags", deserialize_with = "flags_or_default")]
    pub flags: String,
}

impl PreviewPattern {
    pub fn new(find: impl Into<String>, flags: impl Into<String>) -> Self {
        let flags = flags.into();
        Self {
            find: find.into(),
            flags: if flags.is_empty() { default_flags() } else { flags },
        }
    }

    /// Parses pattern input; `None` when the input is blank.
    pub fn parse_input(raw: &str) -> Option<Self> {
        split_input(raw).map(|(find, flags)| Self::new(find, flags))
    }

    pub fn compile(&self) -> Result<Regex, RuleError> {
        compile_pattern(&self.find, &self.flags)
    }
}

/// Regex options decoded from a flag string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags {
    pub global: bool,
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
}

impl FromStr for RegexFlags {
    type Err = RuleError;

    fn from_str(flags: &str) -> Result<Self, Self::Err> {
        let mut parsed = RegexFlags::default();
        for letter in flags.chars() {
            match letter {
                'g' => parsed.global = true,
                'i' => parsed.case_insensitive = true,
                'm' => parsed.multi_line = true,
                's' => parsed.dot_matches_new_line = true,
                // Unicode is always on. Sticky and match indices have no
                // meaning for find-all scans.
                'u' | 'v' | 'y' | 'd' => {}
                other => return Err(RuleError::InvalidFlag(other)),
            }
        }
        Ok(parsed)
    }
}

/// Appends the global flag when it is missing.
pub fn ensure_global(flags: &str) -> Cow<'_, str> {
    if flags.contains('g') {
        Cow::Borrowed(flags)
    } else {
        Cow::Owned(format!("{flags}g"))
    }
}

/// Compiles `pattern` under `flags`, always with find-all semantics.
pub fn compile_pattern(pattern: &str, flags: &str) -> Result<Regex, RuleError> {
    let flags: RegexFlags = ensure_global(flags).parse()?;
    RegexBuilder::new(pattern)
        .case_insensitive(flags.case_insensitive)
        .multi_line(flags.multi_line)
        .dot_matches_new_line(flags.dot_matches_new_line)
        .build()
        .map_err(|err| RuleError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })
}
