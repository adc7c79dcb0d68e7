// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Host events and the single-threaded loop that dispatches them.
//!
//! The host forwards its subscriptions (document edits, viewport changes,
//! rule edits, pattern-input keystrokes) as [`SessionEvent`]s. [`run`] owns
//! the session and waits on the event channel and on the session's next
//! timer deadline at the same time, so throttled and debounced work fires
//! without a second thread touching the session.

use std::time::Instant;

use crossbeam_channel::{Receiver, select};
use tracing::{debug, trace};

use crate::rules::{PreviewPattern, RuleEdit, RuleSource};
use crate::session::{DocumentHost, DocumentSession};

/// Something that happened in the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The document text was edited
    DocumentChanged,
    /// The viewport scrolled or resized
    VisibleRangesChanged,
    /// The rule source was changed outside the session
    RulesChanged,
    /// An edit from the rule editor
    EditRules(RuleEdit),
    /// The pattern input changed; `None` when editing stopped
    PreviewInput(Option<PreviewPattern>),
    /// Raw pattern input text, plain or `/pattern/flags`
    PatternInput(String),
    RecomputeHighlights,
    ApplyBatchReplace,
    /// Ends the loop and detaches the session
    Detach,
}

impl<H: DocumentHost, R: RuleSource> DocumentSession<H, R> {
    /// Dispatches one event. Timers are driven separately via `tick`.
    pub fn handle(&mut self, event: SessionEvent, now: Instant) {
        trace!(?event, "session event");
        match event {
            SessionEvent::DocumentChanged => self.on_document_changed(now),
            SessionEvent::VisibleRangesChanged => self.on_visible_ranges_changed(),
            SessionEvent::RulesChanged => self.on_rules_changed(),
            SessionEvent::EditRules(edit) => {
                // Already reported to the user by `edit_rules`.
                let _ = self.edit_rules(edit);
            }
            SessionEvent::PreviewInput(preview) => self.on_preview_input(preview, now),
            SessionEvent::PatternInput(raw) => self.on_pattern_input(&raw, now),
            SessionEvent::RecomputeHighlights => self.recompute_highlights(),
            SessionEvent::ApplyBatchReplace => {
                // Outcome and failures are reported through `notify`.
                let _ = self.apply_batch_replace();
            }
            SessionEvent::Detach => {}
        }
    }
}

/// Drives `session` until [`SessionEvent::Detach`] arrives or every sender
/// is dropped, then detaches it and returns the host and rule source.
pub fn run<H, R>(mut session: DocumentSession<H, R>, events: Receiver<SessionEvent>) -> (H, R)
where
    H: DocumentHost,
    R: RuleSource,
{
    loop {
        let timer = match session.next_deadline() {
            Some(deadline) => crossbeam_channel::at(deadline),
            None => crossbeam_channel::never(),
        };

        select! {
            recv(events) -> event => match event {
                Ok(SessionEvent::Detach) | Err(_) => break,
                Ok(event) => session.handle(event, Instant::now()),
            },
            recv(timer) -> _ => {
                session.tick(Instant::now());
            }
        }
    }

    debug!("session event loop finished");
    session.detach()
}
