use std::time::Instant;

/// Lifecycle of one typing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    InProgress,
    Finished,
}

/// Mutable state of a single session, owned by its controller.
///
/// Text and its char length are only changed together, through
/// [`SessionState::new`] and [`SessionState::replace_input`].
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) target: String,
    pub(crate) target_len: usize,
    pub(crate) input: String,
    pub(crate) input_len: usize,
    pub(crate) started_at: Option<Instant>,
    // cumulative keystroke-time mistakes, deletions never lower it
    pub(crate) error_count: u32,
    pub(crate) finished: bool,
}

impl SessionState {
    pub fn new(target: impl Into<String>) -> Self {
        let target = target.into();
        let target_len = target.chars().count();
        Self {
            target,
            target_len,
            input: String::new(),
            input_len: 0,
            started_at: None,
            error_count: 0,
            finished: false,
        }
    }

    /// Fresh state bound to the same target.
    pub fn cleared(&self) -> Self {
        Self {
            target: self.target.clone(),
            target_len: self.target_len,
            ..Self::new(String::new())
        }
    }

    pub fn phase(&self) -> Phase {
        if self.finished {
            Phase::Finished
        } else if self.started_at.is_some() {
            Phase::InProgress
        } else {
            Phase::Idle
        }
    }

    /// Swap in a new input, keeping its cached char length in step.
    pub fn replace_input(&mut self, input: &str) {
        self.input.clear();
        self.input.push_str(input);
        self.input_len = input.chars().count();
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn target_len(&self) -> usize {
        self.target_len
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_len(&self) -> usize {
        self.input_len
    }

    pub fn expected_char(&self, idx: usize) -> Option<char> {
        self.target.chars().nth(idx)
    }

    pub fn typed_char(&self, idx: usize) -> Option<char> {
        self.input.chars().nth(idx)
    }
}
