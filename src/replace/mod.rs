// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Sequential (cascading) batch replacement.
//!
//! Every enabled rule is compiled up front, so an invalid rule anywhere in the
//! list fails the batch before a single substitution is made. Rules then run
//! in order over the whole text, each one seeing the previous rule's output.

pub mod template;

use regex::Regex;
use tracing::debug;

use crate::error::ReplaceError;
use crate::rules::ReplaceRule;

pub use template::Template;

/// Result of a successful batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// The fully transformed text
    pub text: String,
    /// Number of rules that ran (disabled rules are not counted)
    pub applied: usize,
    /// Total substitutions made across all rules
    pub replacements: usize,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    index: usize,
    regex: Regex,
    template: Template,
}

/// An ordered, fully validated set of substitutions.
#[derive(Debug, Clone)]
pub struct BatchReplacer {
    rules: Vec<CompiledRule>,
}

impl BatchReplacer {
    /// Compiles every enabled rule. Fails on the first rule that does not
    /// compile, naming its position in `rules`.
    pub fn compile(rules: &[ReplaceRule]) -> Result<Self, ReplaceError> {
        if rules.is_empty() {
            return Err(ReplaceError::EmptyRuleSet);
        }

        let mut compiled = Vec::with_capacity(rules.len());
        for (index, rule) in rules.iter().enumerate() {
            if !rule.is_active() {
                continue;
            }
            let regex = rule
                .compile()
                .map_err(|source| ReplaceError::InvalidPattern { index, source })?;
            let template = Template::new(&rule.replace, &regex);
            compiled.push(CompiledRule {
                index,
                regex,
                template,
            });
        }
        Ok(Self { rules: compiled })
    }

    /// Number of rules that will run.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule in order over `text`.
    pub fn apply(&self, text: &str) -> ReplaceOutcome {
        let mut current = text.to_string();
        let mut replacements = 0;

        for rule in &self.rules {
            let (next, count) = substitute_all(&rule.regex, &rule.template, &current);
            debug!(rule = rule.index, count, "applied replace rule");
            replacements += count;
            current = next;
        }

        ReplaceOutcome {
            text: current,
            applied: self.rules.len(),
            replacements,
        }
    }
}

/// Compiles `rules` and applies them to `text` in one step.
pub fn apply(text: &str, rules: &[ReplaceRule]) -> Result<ReplaceOutcome, ReplaceError> {
    Ok(BatchReplacer::compile(rules)?.apply(text))
}

/// Replaces every non-overlapping match, advancing one character past empty
/// matches the same way the scanner does.
fn substitute_all(regex: &Regex, template: &Template, text: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut cursor = 0;
    let mut count = 0;

    while cursor <= text.len() {
        let whole = match template.literal() {
            Some(replacement) => {
                let Some(m) = regex.find_at(text, cursor) else {
                    break;
                };
                out.push_str(&text[last..m.start()]);
                out.push_str(replacement);
                m.range()
            }
            None => {
                let Some(caps) = regex.captures_at(text, cursor) else {
                    break;
                };
                let Some(m) = caps.get(0) else {
                    break;
                };
                out.push_str(&text[last..m.start()]);
                template.expand_into(&caps, &mut out);
                m.range()
            }
        };
        last = whole.end;
        count += 1;

        if whole.is_empty() {
            match text[whole.end..].chars().next() {
                Some(ch) => cursor = whole.end + ch.len_utf8(),
                None => break,
            }
        } else {
            cursor = whole.end;
        }
    }

    out.push_str(&text[last..]);
    (out, count)
}
