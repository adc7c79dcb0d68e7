// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Ordered regex find/replace rules with live match highlighting.
//!
//! - [`highlight`] scans the visible part of a document for every enabled
//!   rule and the preview pattern, and turns the matches into decorations.
//! - [`replace`] applies the rules to a whole text, one after the other.
//! - [`rules`] holds the rule model and an in-memory rule store.
//! - [`session`] ties the pieces to one host document and decides when a
//!   highlight pass runs.

pub mod config;
pub mod error;
pub mod highlight;
pub mod notice;
pub mod replace;
pub mod rules;
pub mod session;

pub use config::EngineConfig;
pub use error::{ReplaceError, RuleError};
pub use highlight::{HighlightEngine, HighlightResult, MatchScanner, MatchSource, MatchSpan, StyleId};
pub use notice::{Notice, NoticeKind};
pub use replace::{BatchReplacer, ReplaceOutcome};
pub use rules::{PreviewPattern, ReplaceRule, RuleEdit, RuleSource, RuleStore};
pub use session::{DocumentHost, DocumentSession, SessionEvent};
