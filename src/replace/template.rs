// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Replacement template translation.
//!
//! Rule templates use the `$1` / `$&` / `$<name>` / `$$` forms users type
//! into the rule editor. `regex` expands `$name` greedily (`$1a` is the group
//! named `1a`), so templates are rewritten into the unambiguous braced form
//! before they reach [`regex::Captures::expand`].

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TEMPLATE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:(?P<dollar>\$)|(?P<whole>&)|<(?P<named>[^>]*)>|\{(?P<braced>[^}]*)\}|(?P<digits>[0-9][0-9]?))")
        .expect("template token regex is valid")
});

/// A replacement template ready to pass to `regex` expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    expanded: String,
    /// Output for templates that never reference the match
    literal: Option<String>,
}

impl Template {
    /// Translates `template` for a pattern with `regex`'s capture groups.
    pub fn new(template: &str, regex: &Regex) -> Self {
        let group_count = regex.captures_len() - 1;
        let has_names = regex.capture_names().flatten().next().is_some();
        let mut literal = true;

        let expanded = TEMPLATE_TOKEN.replace_all(template, |caps: &Captures<'_>| {
            if caps.name("dollar").is_some() {
                return "$$".to_string();
            }
            if caps.name("whole").is_some() {
                literal = false;
                return "${0}".to_string();
            }
            if let Some(name) = caps.name("named") {
                if has_names {
                    literal = false;
                    return format!("${{{}}}", name.as_str());
                }
                return escape(&caps[0]);
            }
            if let Some(name) = caps.name("braced") {
                literal = false;
                return format!("${{{}}}", name.as_str());
            }
            let digits = &caps["digits"];
            match group_reference(digits, group_count) {
                Some((group, rest)) => {
                    literal = false;
                    format!("${{{group}}}{rest}")
                }
                None => escape(&caps[0]),
            }
        });

        // Lone `$`s the token regex did not consume stay literal.
        let expanded = escape_stray_dollars(&expanded);
        let literal = literal.then(|| expanded.replace("$$", "$"));
        Self { expanded, literal }
    }

    /// The template in `regex` expansion syntax.
    pub fn as_str(&self) -> &str {
        &self.expanded
    }

    /// The replacement text when the template never references the match.
    pub fn literal(&self) -> Option<&str> {
        self.literal.as_deref()
    }

    /// Appends the expansion for one match to `dst`.
    pub fn expand_into(&self, caps: &Captures<'_>, dst: &mut String) {
        match &self.literal {
            Some(text) => dst.push_str(text),
            None => caps.expand(&self.expanded, dst),
        }
    }
}

/// Resolves `$NN`: two digits when that group exists, else one digit
/// followed by a literal digit. Group 0 is not addressable this way.
fn group_reference(digits: &str, group_count: usize) -> Option<(usize, &str)> {
    if let Ok(two) = digits.parse::<usize>() {
        if digits.len() == 2 && (1..=group_count).contains(&two) {
            return Some((two, ""));
        }
    }
    let (first, rest) = digits.split_at(1);
    match first.parse::<usize>() {
        Ok(one) if (1..=group_count).contains(&one) => Some((one, rest)),
        _ => None,
    }
}

fn escape(text: &str) -> String {
    text.replace('$', "$$")
}

/// Doubles every `$` that does not start a `$$` or `${` sequence.
fn escape_stray_dollars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                out.push_str("$$");
                chars.next();
            }
            Some('{') => out.push('$'),
            _ => out.push_str("$$"),
        }
    }
    out
}
