use std::{
    error::Error,
    fs,
    io::{self, stdin, Stdout},
    path::PathBuf,
    time::Duration,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};

use snipt::{
    app::{App, KeyOutcome},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, Settings, SnippetSource},
    logging,
    runtime::{AppEvent, CrosstermEventSource, Runner},
    snippets::{Difficulty, SnippetRegistry},
    ui,
};

/// How long the loop waits for an event before checking again.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// typing practice on real code snippets
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Practice typing real code snippets in the terminal, with live WPM, accuracy and error counts."
)]
pub struct Cli {
    /// language to pull snippets from
    #[clap(short = 'l', long)]
    language: Option<String>,

    /// only pick snippets of this difficulty
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// type a specific bundled snippet by id
    #[clap(long = "snippet", value_name = "ID", conflicts_with_all = ["prompt", "file"])]
    snippet_id: Option<String>,

    /// custom text to type
    #[clap(short = 'p', long, conflicts_with = "file")]
    prompt: Option<String>,

    /// read the text to type from a file
    #[clap(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// live metrics refresh interval in milliseconds
    #[clap(long)]
    tick_rate_ms: Option<u64>,

    /// append each completed session to the results log
    #[clap(long)]
    log_results: bool,

    /// print the available languages and exit
    #[clap(long)]
    list_languages: bool,

    /// persist language, difficulty, tick rate and logging as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line flags layered over the stored config.
    fn to_settings(&self, cfg: &Config) -> io::Result<Settings> {
        let mut merged = cfg.clone();
        if let Some(language) = &self.language {
            merged.language = language.clone();
        }
        if self.difficulty.is_some() {
            merged.difficulty = self.difficulty;
        }
        if let Some(ms) = self.tick_rate_ms {
            merged.tick_rate_ms = ms;
        }
        merged.results_log |= self.log_results;

        let mut settings = Settings::from_config(&merged);
        settings.source = if let Some(id) = &self.snippet_id {
            SnippetSource::ById(id.clone())
        } else if let Some(text) = &self.prompt {
            SnippetSource::Custom(text.clone())
        } else if let Some(path) = &self.file {
            SnippetSource::Custom(normalize(&fs::read_to_string(path)?))
        } else {
            SnippetSource::Random
        };
        Ok(settings)
    }
}

/// Line endings as typed with Enter; a trailing newline is not part of the snippet.
fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n").trim_end_matches('\n').to_string()
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let registry = SnippetRegistry::bundled()?;

    if cli.list_languages {
        for language in registry.list_languages() {
            println!("{language}");
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(e) = logging::init(&AppDirs::log_path()) {
        eprintln!("logging disabled: {e}");
    }

    let store = FileConfigStore::new();
    let settings = cli.to_settings(&store.load())?;
    if cli.save_config {
        store.save(&Config::from(&settings))?;
        info!(path = %store.path().display(), "config saved");
    }

    let events = CrosstermEventSource::new();
    let mut app = App::new(&registry, settings, events.sender())?;
    let runner = Runner::new(events, POLL_INTERVAL);

    let mut terminal = setup_terminal()?;

    let res = run(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        warn!(error = %e, "session loop failed");
    }
    res
}

/// Raw mode plus alternate screen. A failure part way leaves the terminal
/// as it was found.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    or_restore(
        || {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            Terminal::new(CrosstermBackend::new(stdout))
        },
        || {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
        },
    )
}

fn or_restore<T>(
    step: impl FnOnce() -> io::Result<T>,
    restore: impl FnOnce(),
) -> io::Result<T> {
    match step() {
        Ok(value) => Ok(value),
        Err(e) => {
            restore();
            Err(e)
        }
    }
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<CrosstermEventSource>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        let Some(event) = runner.step() else {
            continue;
        };

        let redraw = match event {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => true,
            AppEvent::Key(key) => {
                if app.handle_key(key) == KeyOutcome::Quit {
                    break;
                }
                true
            }
        };

        if redraw {
            terminal.draw(|f| ui::draw(app, f))?;
        }
    }

    Ok(())
}
