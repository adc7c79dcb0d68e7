// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for rule editing, scanning and batch replacement.

use thiserror::Error;

/// Errors raised while compiling or editing replace rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The pattern does not compile under the given flags.
    #[error("invalid pattern /{pattern}/: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A rule with nothing to find.
    #[error("the find pattern is empty")]
    EmptyPattern,

    /// A flag letter that has no regex equivalent.
    #[error("unsupported regex flag '{0}'")]
    InvalidFlag(char),

    /// A positional edit referred to a rule that does not exist.
    #[error("rule index {index} out of range (rule count {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// The persisted rule list or engine config could not be decoded.
    #[error("malformed rule or config data: {0}")]
    Format(String),
}

impl From<serde_json::Error> for RuleError {
    fn from(err: serde_json::Error) -> Self {
        RuleError::Format(err.to_string())
    }
}

/// Errors raised by a batch replace request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplaceError {
    /// An enabled rule failed to compile; nothing was applied.
    #[error("rule #{} has an invalid pattern: {source}", .index + 1)]
    InvalidPattern {
        /// Zero-based position of the offending rule.
        index: usize,
        #[source]
        source: RuleError,
    },

    #[error("no active document to replace in")]
    NoActiveDocument,

    #[error("there are no rules to run")]
    EmptyRuleSet,
}

impl ReplaceError {
    /// Zero-based index of the rule that caused the failure, if any.
    pub fn rule_index(&self) -> Option<usize> {
        match self {
            ReplaceError::InvalidPattern { index, .. } => Some(*index),
            _ => None,
        }
    }
}
