// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Replace rules, the preview pattern, and the ordered rule store.

pub mod rule;
pub mod store;

pub use rule::{DEFAULT_FLAGS, PreviewPattern, RegexFlags, ReplaceRule, compile_pattern, ensure_global};
pub use store::{RuleEdit, RuleSource, RuleStore};
