use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use snipt::app::{App, AppState, KeyOutcome};
use snipt::config::{Settings, SnippetSource};
use snipt::runtime::{AppEvent, Runner, TestEventSource};
use snipt::session::Phase;
use snipt::SnippetRegistry;

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn custom(text: &str) -> Settings {
    Settings {
        source: SnippetSource::Custom(text.to_string()),
        tick_rate: Duration::from_millis(16),
        ..Settings::default()
    }
}

// Drives the app the same way the binary does, without a terminal.
fn drive(app: &mut App, runner: &Runner<TestEventSource>, max_steps: u32) -> bool {
    for _ in 0..max_steps {
        match runner.step() {
            Some(AppEvent::Tick) => {
                app.on_tick();
            }
            Some(AppEvent::Resize) => {}
            Some(AppEvent::Key(k)) => {
                if app.handle_key(k) == KeyOutcome::Quit {
                    return true;
                }
            }
            None => {}
        }
    }
    false
}

#[test]
fn headless_typing_flow_completes() {
    let registry = SnippetRegistry::default();
    let (tx, rx) = mpsc::channel();
    let mut app = App::new(&registry, custom("hi"), tx.clone()).unwrap();
    let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(5));

    tx.send(key('h')).unwrap();
    tx.send(key('i')).unwrap();

    for _ in 0..100u32 {
        if let Some(AppEvent::Key(k)) = runner.step() {
            app.handle_key(k);
        }
        if app.controller.is_finished() {
            break;
        }
    }

    assert_eq!(app.state, AppState::Results);
    assert!(!app.is_refreshing());
    let snapshot = app.controller.snapshot();
    assert_eq!(snapshot.correct_chars, 2);
    assert_eq!(snapshot.total_chars, 2);
    assert_eq!(snapshot.accuracy, 100.0);
}

#[test]
fn headless_ticks_refresh_live_metrics() {
    let registry = SnippetRegistry::default();
    let (tx, rx) = mpsc::channel();
    let mut app = App::new(&registry, custom("hello"), tx.clone()).unwrap();
    let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(50));

    tx.send(key('h')).unwrap();
    let mut ticks = 0;
    for _ in 0..200u32 {
        match runner.step() {
            Some(AppEvent::Key(k)) => {
                app.handle_key(k);
            }
            Some(AppEvent::Tick) => {
                assert!(app.on_tick());
                ticks += 1;
                if ticks == 3 {
                    break;
                }
            }
            _ => {}
        }
    }

    assert_eq!(ticks, 3);
    assert_eq!(app.controller.phase(), Phase::InProgress);
    assert_eq!(app.controller.snapshot().total_chars, 5);
    assert_eq!(app.controller.snapshot().correct_chars, 1);
}

#[test]
fn headless_retry_stops_ticks() {
    let registry = SnippetRegistry::default();
    let (tx, rx) = mpsc::channel();
    let mut app = App::new(&registry, custom("abc"), tx.clone()).unwrap();
    let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(50));

    tx.send(key('a')).unwrap();
    if let Some(AppEvent::Key(k)) = runner.step() {
        app.handle_key(k);
    }
    assert!(app.is_refreshing());

    app.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
    assert!(!app.is_refreshing());

    // drain anything sent before the cancel, then the queue stays quiet
    while runner.step().is_some() {}
    assert!(runner.step().is_none());
    assert_eq!(app.controller.phase(), Phase::Idle);
}

#[test]
fn headless_escape_quits() {
    let registry = SnippetRegistry::default();
    let (tx, rx) = mpsc::channel();
    let mut app = App::new(&registry, custom("abc"), tx.clone()).unwrap();
    let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(5));

    tx.send(key('a')).unwrap();
    tx.send(AppEvent::Resize).unwrap();
    tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)))
        .unwrap();

    assert!(drive(&mut app, &runner, 50));
    assert_eq!(app.controller.input(), "a");
}

#[test]
fn headless_disconnected_source_yields_nothing() {
    let (tx, rx) = mpsc::channel::<AppEvent>();
    drop(tx);
    let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(5));
    assert!(runner.step().is_none());
}
