use std::sync::mpsc::Sender;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

use crate::config::{Settings, SnippetSource};
use crate::controller::{InputEffect, SessionController, SessionMeta};
use crate::error::{AppError, Result};
use crate::results_log::CsvResultsLog;
use crate::runtime::{AppEvent, RefreshTicker};
use crate::session::Phase;
use crate::snippets::{Snippet, SnippetRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App<'r> {
    pub settings: Settings,
    pub language: String,
    pub snippet: Snippet,
    pub controller: SessionController,
    pub state: AppState,
    registry: &'r SnippetRegistry,
    tick_tx: Sender<AppEvent>,
    refresh: Option<RefreshTicker>,
}

impl<'r> App<'r> {
    pub fn new(
        registry: &'r SnippetRegistry,
        settings: Settings,
        tick_tx: Sender<AppEvent>,
    ) -> Result<Self> {
        let (language, snippet) = choose_snippet(registry, &settings)?;
        let mut controller = SessionController::new(
            snippet.code.clone(),
            SessionMeta::for_snippet(&language, &snippet),
        );

        if settings.results_log {
            controller.add_listener(Box::new(CsvResultsLog::new()));
        }

        debug!(%language, id = %snippet.id, "app ready");
        Ok(Self {
            settings,
            language,
            snippet,
            controller,
            state: AppState::Typing,
            registry,
            tick_tx,
            refresh: None,
        })
    }

    /// Same snippet, fresh session.
    pub fn retry(&mut self) {
        self.stop_refresh();
        self.controller.reset();
        self.state = AppState::Typing;
    }

    /// Another snippet from the same source.
    pub fn new_snippet(&mut self) {
        match choose_snippet(self.registry, &self.settings) {
            Ok((language, snippet)) => {
                self.stop_refresh();
                self.controller.retarget(
                    snippet.code.clone(),
                    SessionMeta::for_snippet(&language, &snippet),
                );
                self.language = language;
                self.snippet = snippet;
                self.state = AppState::Typing;
            }
            Err(e) => warn!(error = %e, "keeping current snippet"),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.kind == KeyEventKind::Release {
            return KeyOutcome::Continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL) && is_chord(key);
        match (key.code, ctrl) {
            (KeyCode::Esc, _) | (KeyCode::Char('c'), true) => return KeyOutcome::Quit,
            (KeyCode::Char('r'), true) => {
                self.retry();
                return KeyOutcome::Continue;
            }
            (KeyCode::Char('n'), true) => {
                self.new_snippet();
                return KeyOutcome::Continue;
            }
            _ => {}
        }

        match self.state {
            AppState::Typing => {
                if let Some(candidate) = self.candidate_input(key) {
                    self.apply_input(&candidate);
                }
            }
            AppState::Results => match key.code {
                KeyCode::Char('r') => self.retry(),
                KeyCode::Char('n') => self.new_snippet(),
                _ => {}
            },
        }

        KeyOutcome::Continue
    }

    /// Full input text the key press would produce.
    fn candidate_input(&self, key: KeyEvent) -> Option<String> {
        if is_chord(key) {
            return None;
        }

        let mut text = self.controller.input().to_string();
        match key.code {
            KeyCode::Char(c) => text.push(c),
            KeyCode::Enter => text.push('\n'),
            KeyCode::Tab => text.push('\t'),
            KeyCode::Backspace => {
                text.pop()?;
            }
            _ => return None,
        }
        Some(text)
    }

    /// Feed a full input string to the session.
    pub fn apply_input(&mut self, text: &str) -> InputEffect {
        let effect = self.controller.handle_input(text);
        match effect {
            InputEffect::Completed(_) => {
                self.stop_refresh();
                self.state = AppState::Results;
            }
            InputEffect::Accepted => {
                if self.controller.phase() == Phase::InProgress && self.refresh.is_none() {
                    self.refresh = Some(RefreshTicker::start(
                        self.tick_tx.clone(),
                        self.settings.tick_rate,
                    ));
                }
            }
            InputEffect::Rejected => {}
        }
        effect
    }

    /// Returns true when the live metrics changed and a redraw is due.
    pub fn on_tick(&mut self) -> bool {
        self.controller.tick().is_some()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_some()
    }

    fn stop_refresh(&mut self) {
        if let Some(ticker) = self.refresh.take() {
            ticker.cancel();
        }
    }
}

/// Ctrl or Alt shortcuts that must not be typed. AltGr arrives as
/// Ctrl+Alt on some platforms and still produces a character.
fn is_chord(key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    ctrl ^ alt
}

fn choose_snippet(registry: &SnippetRegistry, settings: &Settings) -> Result<(String, Snippet)> {
    match &settings.source {
        SnippetSource::Random => {
            let snippet = registry.pick(&settings.language, settings.difficulty)?;
            Ok((settings.language.clone(), snippet.clone()))
        }
        SnippetSource::ById(id) => {
            let (language, snippet) = registry.get_by_id(id)?;
            Ok((language.to_string(), snippet.clone()))
        }
        SnippetSource::Custom(text) if text.is_empty() => Err(AppError::EmptySnippet),
        SnippetSource::Custom(text) => Ok((settings.language.clone(), Snippet::custom(text.clone()))),
    }
}
