// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory ordered rule list and the edits that can be made to it.

use tracing::debug;

use crate::error::RuleError;
use crate::rules::rule::{DEFAULT_FLAGS, PreviewPattern, ReplaceRule, compile_pattern};

/// Read access to the current rules and preview, plus the edits the session
/// forwards from the rule editor.
///
/// Highlighting reads a fresh snapshot at the start of every pass.
pub trait RuleSource {
    /// The ordered rule list as it is right now.
    fn rule_snapshot(&self) -> Vec<ReplaceRule>;

    /// The pattern being composed, if any.
    fn preview_pattern(&self) -> Option<PreviewPattern>;

    fn set_preview_pattern(&mut self, preview: Option<PreviewPattern>);

    /// Applies a single edit to the rule list.
    fn apply_edit(&mut self, edit: RuleEdit) -> Result<(), RuleError>;
}

/// A positional edit to the rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleEdit {
    /// Validates and appends a rule.
    Add(ReplaceRule),
    /// Validates and overwrites the rule at `index`.
    Save { index: usize, rule: ReplaceRule },
    Delete(usize),
    /// Inserts a copy directly after `index`.
    Duplicate(usize),
    SetEnabled { index: usize, enabled: bool },
    MoveUp(usize),
    MoveDown(usize),
    /// Removes `from`, then inserts before `to` in the shortened list.
    Move { from: usize, to: usize },
    /// Replaces the whole list, e.g. after loading it from storage.
    ReplaceAll(Vec<ReplaceRule>),
}

/// Ordered rule list with a single preview slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleStore {
    rules: Vec<ReplaceRule>,
    preview: Option<PreviewPattern>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<ReplaceRule>) -> Self {
        Self {
            rules,
            preview: None,
        }
    }

    /// Decodes the persisted `[{find, replace, flags, enabled}, ...]` format.
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        let rules: Vec<ReplaceRule> = serde_json::from_str(json)?;
        Ok(Self::with_rules(rules))
    }

    /// Encodes the rule list in the persisted format.
    pub fn to_json(&self) -> Result<String, RuleError> {
        Ok(serde_json::to_string_pretty(&self.rules)?)
    }

    pub fn rules(&self) -> &[ReplaceRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ReplaceRule> {
        self.rules.get(index)
    }

    /// Applies an edit. Failed edits leave the list untouched.
    pub fn apply(&mut self, edit: RuleEdit) -> Result<(), RuleError> {
        debug!(?edit, rules = self.rules.len(), "applying rule edit");
        match edit {
            RuleEdit::Add(rule) => {
                let rule = validated(rule)?;
                self.rules.push(rule);
            }
            RuleEdit::Save { index, rule } => {
                self.check_index(index)?;
                let mut rule = validated(rule)?;
                // Saving from the editor keeps the rule's enabled state.
                rule.enabled = self.rules[index].enabled;
                self.rules[index] = rule;
            }
            RuleEdit::Delete(index) => {
                self.check_index(index)?;
                self.rules.remove(index);
            }
            RuleEdit::Duplicate(index) => {
                self.check_index(index)?;
                let copy = self.rules[index].clone();
                self.rules.insert(index + 1, copy);
            }
            RuleEdit::SetEnabled { index, enabled } => {
                self.check_index(index)?;
                self.rules[index].enabled = enabled;
            }
            RuleEdit::MoveUp(index) => {
                self.check_index(index)?;
                if index > 0 {
                    self.rules.swap(index, index - 1);
                }
            }
            RuleEdit::MoveDown(index) => {
                self.check_index(index)?;
                if index + 1 < self.rules.len() {
                    self.rules.swap(index, index + 1);
                }
            }
            RuleEdit::Move { from, to } => {
                self.check_index(from)?;
                let moved = self.rules.remove(from);
                let to = to.min(self.rules.len());
                self.rules.insert(to, moved);
            }
            RuleEdit::ReplaceAll(rules) => {
                self.rules = rules;
            }
        }
        Ok(())
    }

    /// Indices of rules whose find, replace or flags contain `query`,
    /// ignoring case. An empty query matches every rule.
    pub fn search(&self, query: &str) -> Vec<usize> {
        let query = query.trim().to_lowercase();
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| {
                query.is_empty()
                    || rule.find.to_lowercase().contains(&query)
                    || rule.replace.to_lowercase().contains(&query)
                    || rule.flags.to_lowercase().contains(&query)
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// All rules as numbered export blocks separated by blank lines.
    pub fn export_all(&self) -> String {
        self.rules
            .iter()
            .enumerate()
            .map(|(index, rule)| format!("{}:\n{}", index + 1, rule.to_export_text()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn check_index(&self, index: usize) -> Result<(), RuleError> {
        if index < self.rules.len() {
            Ok(())
        } else {
            Err(RuleError::IndexOutOfRange {
                index,
                len: self.rules.len(),
            })
        }
    }
}

/// Rejects blank patterns, fills in default flags and makes sure the pattern
/// compiles.
fn validated(mut rule: ReplaceRule) -> Result<ReplaceRule, RuleError> {
    if rule.find.trim().is_empty() {
        return Err(RuleError::EmptyPattern);
    }
    if rule.flags.is_empty() {
        rule.flags = DEFAULT_FLAGS.to_string();
    }
    compile_pattern(&rule.find, &rule.flags)?;
    Ok(rule)
}

impl RuleSource for RuleStore {
    fn rule_snapshot(&self) -> Vec<ReplaceRule> {
        self.rules.clone()
    }

    fn preview_pattern(&self) -> Option<PreviewPattern> {
        self.preview.clone()
    }

    fn set_preview_pattern(&mut self, preview: Option<PreviewPattern>) {
        self.preview = preview;
    }

    fn apply_edit(&mut self, edit: RuleEdit) -> Result<(), RuleError> {
        self.apply(edit)
    }
}
