use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use typesprint::app::App;
use typesprint::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use typesprint::session::{Session, SessionConfig, SessionState, TestDuration};
use typesprint::word_source::{FailingWordSource, StaticWordSource, WordSource};

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn code(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

// Headless integration using the internal runtime + App without a TTY.
// Fetch completions travel through the same channel as key events, the
// way the binary wires them.
fn headless(
    source: Arc<dyn WordSource>,
    duration: TestDuration,
) -> (
    App,
    Runner<TestEventSource, FixedTicker>,
    mpsc::Sender<AppEvent>,
) {
    let (tx, rx) = mpsc::channel();
    let session = Session::new(SessionConfig::default(), duration);
    let app = App::new(session, source, tx.clone());
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );
    (app, runner, tx)
}

/// Drive the loop until `done` holds or the step budget runs out
fn pump(
    app: &mut App,
    runner: &Runner<TestEventSource, FixedTicker>,
    now: Instant,
    mut done: impl FnMut(&App) -> bool,
) {
    for _ in 0..400u32 {
        let event = runner.step();
        app.handle_event(event, now);
        if done(app) {
            return;
        }
    }
}

#[test]
fn headless_typing_flow_scores_words() {
    let source = Arc::new(StaticWordSource::from_text("the quick brown"));
    let (mut app, runner, tx) = headless(source, TestDuration::Medium);
    let t0 = Instant::now();

    tx.send(code(KeyCode::Enter)).unwrap();
    pump(&mut app, &runner, t0, |app| !app.session.words().is_empty());
    assert_eq!(app.session.state(), SessionState::Running);

    for c in "the qick brown ".chars() {
        tx.send(key(c)).unwrap();
    }
    pump(&mut app, &runner, t0, |app| app.session.completed_words() == 3);

    assert_eq!(app.session.correct_words(), 2);
    assert_eq!(app.session.accuracy(), 67);
    assert!(app.session.error_set().contains("qick"));

    tx.send(code(KeyCode::Backspace)).unwrap();
    pump(&mut app, &runner, t0, |app| app.session.completed_words() == 2);
    assert_eq!(app.session.input(), "brown");
    assert_eq!(app.session.correct_words(), 2);
}

#[test]
fn headless_timed_session_finishes_by_time() {
    let source = Arc::new(StaticWordSource::from_text("a b c"));
    let (mut app, runner, tx) = headless(source, TestDuration::Short);
    let t0 = Instant::now();

    tx.send(code(KeyCode::Enter)).unwrap();
    pump(&mut app, &runner, t0, |app| !app.session.words().is_empty());

    for c in "a b ".chars() {
        tx.send(key(c)).unwrap();
    }
    pump(&mut app, &runner, t0 + Duration::from_secs(15), |app| {
        app.session.completed_words() == 2
    });
    assert_eq!(app.session.remaining_secs(), 15);
    assert_eq!(app.session.wpm(), 8.0);

    pump(&mut app, &runner, t0 + Duration::from_secs(31), |app| {
        app.session.state() == SessionState::Finished
    });
    assert_eq!(app.session.state(), SessionState::Finished);
    assert_eq!(app.session.remaining_secs(), 0);
    assert_eq!(app.session.wpm(), 4.0);

    // typing after the bell changes nothing
    tx.send(key('c')).unwrap();
    tx.send(key(' ')).unwrap();
    pump(&mut app, &runner, t0 + Duration::from_secs(40), |_| false);
    assert_eq!(app.session.completed_words(), 2);
}

#[test]
fn headless_failed_fetch_still_counts_down() {
    let (mut app, runner, tx) = headless(Arc::new(FailingWordSource), TestDuration::Short);
    let t0 = Instant::now();

    tx.send(code(KeyCode::Enter)).unwrap();
    pump(&mut app, &runner, t0, |app| app.session.last_fetch_error().is_some());
    assert_eq!(app.session.state(), SessionState::Running);

    for c in "word ".chars() {
        tx.send(key(c)).unwrap();
    }
    pump(&mut app, &runner, t0 + Duration::from_secs(10), |app| {
        app.session.input() == "word"
    });
    assert!(app.session.transcript().is_empty());
    assert_eq!(app.session.remaining_secs(), 20);
}

#[test]
fn headless_restart_after_finish_starts_fresh() {
    let source = Arc::new(StaticWordSource::from_text("one two"));
    let (mut app, runner, tx) = headless(source, TestDuration::Short);
    let t0 = Instant::now();

    tx.send(code(KeyCode::Enter)).unwrap();
    pump(&mut app, &runner, t0, |app| !app.session.words().is_empty());
    for c in "one ".chars() {
        tx.send(key(c)).unwrap();
    }
    pump(&mut app, &runner, t0, |app| app.session.completed_words() == 1);
    pump(&mut app, &runner, t0 + Duration::from_secs(30), |app| {
        app.session.state() == SessionState::Finished
    });

    tx.send(code(KeyCode::Char('3'))).unwrap();
    tx.send(code(KeyCode::Enter)).unwrap();
    let t1 = t0 + Duration::from_secs(35);
    pump(&mut app, &runner, t1, |app| app.session.is_running());

    assert_eq!(app.session.duration(), TestDuration::Long);
    assert_eq!(app.session.remaining_secs(), 120);
    assert!(app.session.transcript().is_empty());
    assert_eq!(app.session.generation(), 2);
}
