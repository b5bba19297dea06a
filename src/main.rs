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
use std::{
    error::Error,
    io::{self, stdin},
    sync::Arc,
    time::{Duration, Instant},
};
use typesprint::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging::init_file_logger,
    runtime::{AppEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker},
    session::{Session, TestDuration},
    word_source::{BundledWordSource, HttpWordSource, StaticWordSource, WordSource},
    POLL_INTERVAL_MS,
};

/// timed typing test with live wpm and accuracy
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed typing test: type the words shown before the clock runs out and get your words per minute and accuracy."
)]
pub struct Cli {
    /// number of seconds to run test
    #[clap(short = 's', long, value_enum)]
    number_of_secs: Option<TestDuration>,

    /// number of words to request per fetch
    #[clap(short = 'w', long)]
    number_of_words: Option<usize>,

    /// custom prompt to use instead of fetched words
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// use the bundled word list instead of the word service
    #[clap(long, conflicts_with = "prompt")]
    offline: bool,

    /// base url of the word service
    #[clap(long)]
    url: Option<String>,

    /// withdraw credit for a correct word when it is taken back with backspace
    #[clap(long)]
    rescore: bool,
}

impl Cli {
    /// Layer command line overrides on top of the stored config
    fn apply(&self, mut config: Config) -> Config {
        if let Some(duration) = self.number_of_secs {
            config.duration_secs = duration.secs();
        }
        if let Some(count) = self.number_of_words {
            config.word_count = count;
        }
        if let Some(ref url) = self.url {
            config.word_source_url = url.clone();
        }
        if self.rescore {
            config.rescore_corrections = true;
        }
        config
    }

    fn word_source(&self, config: &Config) -> Result<Arc<dyn WordSource>, Box<dyn Error>> {
        if let Some(ref prompt) = self.prompt {
            return Ok(Arc::new(StaticWordSource::from_text(prompt)));
        }
        if self.offline {
            let bundled = BundledWordSource::english().ok_or("bundled word list is missing")?;
            return Ok(Arc::new(bundled));
        }
        Ok(Arc::new(HttpWordSource::new(
            config.word_source_url.clone(),
            Duration::from_secs(config.fetch_timeout_secs),
        )?))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = AppDirs::log_path() {
        if let Err(err) = init_file_logger(&log_path) {
            eprintln!("logging disabled: {err}");
        }
    }

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    let source = cli.word_source(&config)?;
    log::info!("starting with {config:?}");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    let session = Session::new(config.session_config(), config.duration());
    let mut app = App::new(session, source, events.sender());
    let runner = Runner::new(
        events,
        FixedTicker::new(Duration::from_millis(POLL_INTERVAL_MS)),
    );

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // only the picked timer is remembered, not one-off command line flags
    let mut persisted = store.load();
    persisted.duration_secs = app.session.duration().secs();
    if let Err(err) = store.save(&persisted) {
        log::warn!("could not save config to {}: {err}", store.path().display());
    }

    result
}

fn start_tui<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let event = runner.step();
        app.handle_event(event, Instant::now());

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;
    use typesprint::runtime::{AppEvent, TestEventSource};
    use typesprint::session::CorrectionPolicy;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["typesprint"]);

        assert_eq!(cli.number_of_secs, None);
        assert_eq!(cli.number_of_words, None);
        assert_eq!(cli.prompt, None);
        assert!(!cli.offline);
        assert!(!cli.rescore);
    }

    #[test]
    fn test_cli_number_of_secs() {
        let cli = Cli::parse_from(["typesprint", "-s", "30"]);
        assert_eq!(cli.number_of_secs, Some(TestDuration::Short));

        let cli = Cli::parse_from(["typesprint", "--number-of-secs", "120"]);
        assert_eq!(cli.number_of_secs, Some(TestDuration::Long));
    }

    #[test]
    fn test_cli_rejects_unsupported_duration() {
        assert!(Cli::try_parse_from(["typesprint", "-s", "45"]).is_err());
    }

    #[test]
    fn test_cli_prompt_conflicts_with_offline() {
        assert!(Cli::try_parse_from(["typesprint", "-p", "a b", "--offline"]).is_err());
    }

    #[test]
    fn test_cli_apply_overrides() {
        let cli = Cli::parse_from([
            "typesprint",
            "-s",
            "120",
            "-w",
            "200",
            "--url",
            "http://localhost:1234/word",
            "--rescore",
        ]);
        let config = cli.apply(Config::default());

        assert_eq!(config.duration(), TestDuration::Long);
        assert_eq!(config.word_count, 200);
        assert_eq!(config.word_source_url, "http://localhost:1234/word");
        assert_eq!(config.session_config().correction, CorrectionPolicy::Rescore);
    }

    #[test]
    fn test_cli_apply_keeps_stored_values() {
        let stored = Config {
            duration_secs: 30,
            word_count: 42,
            ..Config::default()
        };
        let config = Cli::parse_from(["typesprint"]).apply(stored.clone());
        assert_eq!(config, stored);
    }

    #[test]
    fn test_word_source_from_prompt() {
        let cli = Cli::parse_from(["typesprint", "-p", "hello world"]);
        let source = cli.word_source(&Config::default()).unwrap();
        assert_eq!(source.fetch_words(1000).unwrap(), vec!["hello", "world"]);
    }

    #[test]
    fn test_word_source_offline() {
        let cli = Cli::parse_from(["typesprint", "--offline"]);
        let source = cli.word_source(&Config::default()).unwrap();
        assert_eq!(source.fetch_words(25).unwrap().len(), 25);
    }

    #[test]
    fn test_start_tui_quits_on_esc() {
        let (tx, rx) = mpsc::channel();
        let session = Session::new(Config::default().session_config(), TestDuration::Short);
        let mut app = App::new(
            session,
            Arc::new(StaticWordSource::from_text("hi")),
            tx.clone(),
        );
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(5)),
        );
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

        tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)))
            .unwrap();
        tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)))
            .unwrap();

        start_tui(&mut terminal, &mut app, &runner).unwrap();
        assert!(app.should_quit);
        assert!(app.session.is_running());
    }
}
