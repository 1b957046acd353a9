use std::fmt;
use std::time::Instant;

use tracing::{debug, info, trace};

use crate::metrics::{compute_metrics, MetricsSnapshot};
use crate::session::{Phase, SessionState};
use crate::snippets::{Difficulty, Snippet};

/// Result of feeding one input change to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEffect {
    /// Longer than the target, or the session already finished. Nothing changed.
    Rejected,
    Accepted,
    /// The input now equals the target; carries the final metrics.
    Completed(MetricsSnapshot),
}

/// Display classification of one target character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Untyped,
    Correct,
    Incorrect,
    Cursor,
}

/// What is being typed, for listeners and display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMeta {
    pub language: String,
    pub snippet_id: String,
    pub difficulty: Option<Difficulty>,
}

impl SessionMeta {
    pub fn for_snippet(language: &str, snippet: &Snippet) -> Self {
        Self {
            language: language.to_string(),
            snippet_id: snippet.id.clone(),
            difficulty: Some(snippet.difficulty),
        }
    }
}

impl Default for SessionMeta {
    fn default() -> Self {
        Self {
            language: "text".to_string(),
            snippet_id: "custom".to_string(),
            difficulty: None,
        }
    }
}

/// Receives the final metrics of every completed session.
pub trait CompletionListener {
    fn on_complete(&mut self, meta: &SessionMeta, snapshot: &MetricsSnapshot);
}

impl<F> CompletionListener for F
where
    F: FnMut(&SessionMeta, &MetricsSnapshot),
{
    fn on_complete(&mut self, meta: &SessionMeta, snapshot: &MetricsSnapshot) {
        self(meta, snapshot)
    }
}

/// Drives one typing session against a fixed target text.
pub struct SessionController {
    meta: SessionMeta,
    state: SessionState,
    published: MetricsSnapshot,
    listeners: Vec<Box<dyn CompletionListener>>,
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("meta", &self.meta)
            .field("state", &self.state)
            .field("published", &self.published)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SessionController {
    pub fn new(target: impl Into<String>, meta: SessionMeta) -> Self {
        Self {
            meta,
            state: SessionState::new(target),
            published: MetricsSnapshot::zero(),
            listeners: Vec::new(),
        }
    }

    /// Idle session for `target` with no metadata attached.
    pub fn start(target: impl Into<String>) -> Self {
        Self::new(target, SessionMeta::default())
    }

    pub fn with_listener(mut self, listener: impl CompletionListener + 'static) -> Self {
        self.add_listener(Box::new(listener));
        self
    }

    pub fn add_listener(&mut self, listener: Box<dyn CompletionListener>) {
        self.listeners.push(listener);
    }

    /// Bind a new target, keeping registered listeners.
    pub fn retarget(&mut self, target: impl Into<String>, meta: SessionMeta) {
        self.state = SessionState::new(target);
        self.meta = meta;
        self.published = MetricsSnapshot::zero();
        debug!(snippet = %self.meta.snippet_id, "session retargeted");
    }

    pub fn handle_input(&mut self, new_input: &str) -> InputEffect {
        self.handle_input_at(new_input, Instant::now())
    }

    /// Apply the full accumulated input as of `now`.
    pub fn handle_input_at(&mut self, new_input: &str, now: Instant) -> InputEffect {
        if self.state.finished {
            trace!("input after completion ignored");
            return InputEffect::Rejected;
        }

        let new_len = new_input.chars().count();
        if new_len > self.state.target_len {
            trace!(new_len, target_len = self.state.target_len, "overtyping rejected");
            return InputEffect::Rejected;
        }

        self.start_clock(new_len, now);
        self.record_mistake(new_input, new_len);

        self.state.replace_input(new_input);

        if self.state.input == self.state.target {
            return InputEffect::Completed(self.complete(now));
        }

        InputEffect::Accepted
    }

    // The clock starts on the first accepted character and never restarts.
    fn start_clock(&mut self, new_len: usize, now: Instant) {
        if self.state.started_at.is_none() && self.state.input_len == 0 && new_len == 1 {
            self.state.started_at = Some(now);
            debug!(snippet = %self.meta.snippet_id, "session started");
        }
    }

    // Only an appended character is compared; deletions leave the tally alone.
    fn record_mistake(&mut self, new_input: &str, new_len: usize) {
        if new_len <= self.state.input_len {
            return;
        }

        let idx = new_len - 1;
        let typed = new_input.chars().last();
        let expected = self.state.expected_char(idx);
        if typed != expected {
            self.state.error_count += 1;
            trace!(idx, ?typed, ?expected, errors = self.state.error_count, "mistake");
        }
    }

    fn complete(&mut self, now: Instant) -> MetricsSnapshot {
        self.state.finished = true;
        let snapshot = self.compute_at(now);
        self.published = snapshot;

        info!(
            language = %self.meta.language,
            snippet = %self.meta.snippet_id,
            wpm = snapshot.wpm,
            accuracy = snapshot.accuracy,
            errors = snapshot.error_count,
            "session completed"
        );

        for listener in self.listeners.iter_mut() {
            listener.on_complete(&self.meta, &snapshot);
        }

        snapshot
    }

    pub fn tick(&mut self) -> Option<MetricsSnapshot> {
        self.tick_at(Instant::now())
    }

    /// Refresh the live metrics. Only produces a snapshot while in progress
    /// with something typed.
    pub fn tick_at(&mut self, now: Instant) -> Option<MetricsSnapshot> {
        if self.phase() != Phase::InProgress || self.state.input_len == 0 {
            return None;
        }

        let snapshot = self.compute_at(now);
        self.published = snapshot;
        Some(snapshot)
    }

    fn compute_at(&self, now: Instant) -> MetricsSnapshot {
        let elapsed_ms = self
            .state
            .started_at
            .map(|started| now.saturating_duration_since(started).as_millis() as u64)
            .unwrap_or(0);

        compute_metrics(
            &self.state.input,
            &self.state.target,
            self.state.error_count,
            elapsed_ms,
        )
    }

    /// Back to idle on the same target.
    pub fn reset(&mut self) {
        self.state = self.state.cleared();
        self.published = MetricsSnapshot::zero();
        debug!(snippet = %self.meta.snippet_id, "session reset");
    }

    pub fn classify(&self, idx: usize) -> CharClass {
        if idx < self.state.input_len {
            if self.state.typed_char(idx) == self.state.expected_char(idx) {
                CharClass::Correct
            } else {
                CharClass::Incorrect
            }
        } else if idx == self.state.input_len {
            CharClass::Cursor
        } else {
            CharClass::Untyped
        }
    }

    /// Every target character with its classification, in order.
    pub fn classifications(&self) -> impl Iterator<Item = (char, CharClass)> + '_ {
        let mut typed = self.state.input.chars();
        let input_len = self.state.input_len;

        self.state
            .target
            .chars()
            .enumerate()
            .map(move |(idx, expected)| {
                let class = match typed.next() {
                    Some(c) if c == expected => CharClass::Correct,
                    Some(_) => CharClass::Incorrect,
                    None if idx == input_len => CharClass::Cursor,
                    None => CharClass::Untyped,
                };
                (expected, class)
            })
    }

    /// The character typed at `idx`, if any.
    pub fn typed_char(&self, idx: usize) -> Option<char> {
        self.state.typed_char(idx)
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.published
    }

    pub fn input(&self) -> &str {
        &self.state.input
    }

    pub fn input_len(&self) -> usize {
        self.state.input_len
    }

    pub fn target(&self) -> &str {
        &self.state.target
    }

    pub fn target_len(&self) -> usize {
        self.state.target_len
    }

    pub fn error_count(&self) -> u32 {
        self.state.error_count
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.state.started_at
    }

    pub fn meta(&self) -> &SessionMeta {
        &self.meta
    }
}
