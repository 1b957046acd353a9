// Library surface for headless/integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod results_log;
pub mod runtime;
pub mod session;
pub mod snippets;
pub mod ui;

pub use app::{App, AppState};
pub use controller::{CharClass, CompletionListener, InputEffect, SessionController, SessionMeta};
pub use metrics::{compute_metrics, MetricsSnapshot};
pub use snippets::{Difficulty, Snippet, SnippetRegistry};
