use std::collections::BTreeSet;

use clap::ValueEnum;

use crate::error::FetchError;
use crate::timer::{Timer, TimerSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionState {
    Idle,
    Running,
    Finished,
}

/// Selectable session lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, strum_macros::Display)]
pub enum TestDuration {
    #[value(name = "30")]
    #[strum(serialize = "30s")]
    Short,
    #[default]
    #[value(name = "60")]
    #[strum(serialize = "60s")]
    Medium,
    #[value(name = "120")]
    #[strum(serialize = "120s")]
    Long,
}

impl TestDuration {
    pub const ALL: [TestDuration; 3] = [Self::Short, Self::Medium, Self::Long];

    pub fn secs(self) -> u64 {
        match self {
            Self::Short => 30,
            Self::Medium => 60,
            Self::Long => 120,
        }
    }

    pub fn from_secs(secs: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.secs() == secs)
    }

    pub fn next(self) -> Self {
        match self {
            Self::Short => Self::Medium,
            Self::Medium | Self::Long => Self::Long,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Long => Self::Medium,
            Self::Medium | Self::Short => Self::Short,
        }
    }
}

/// What happens to the correct-word count when the last attempt is taken back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrectionPolicy {
    /// Keep the credit already given, capped at the transcript length
    #[default]
    KeepScore,
    /// Withdraw the credit if the popped attempt matched its target
    Rescore,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Words requested per fetch
    pub word_count: usize,
    /// Ask for more words once fewer than this many untyped words remain
    pub refill_threshold: usize,
    pub correction: CorrectionPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            word_count: 1000,
            refill_threshold: 50,
            correction: CorrectionPolicy::KeepScore,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Fresh list for a new session
    Replace,
    /// More words behind the current list
    Append,
}

/// A word fetch the owner of the session has to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub count: usize,
    pub kind: FetchKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotRunning,
    Empty,
    OutOfWords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Accepted { correct: bool },
    Ignored(IgnoreReason),
}

/// Display classification of a single target slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordMark {
    Correct,
    Incorrect,
    /// Typed wrong, but its text has since left the error set
    Unmarked,
    Current,
    Pending,
}

/// The typing session engine. Owns every piece of mutable session state;
/// each event type has exactly one transition method.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    duration: TestDuration,
    active_secs: u64,
    timer: Timer,
    words: Vec<String>,
    transcript: Vec<String>,
    error_set: BTreeSet<String>,
    input: String,
    correct_words: usize,
    generation: u64,
    fetch_in_flight: bool,
    last_fetch_error: Option<String>,
}

impl Session {
    pub fn new(config: SessionConfig, duration: TestDuration) -> Self {
        Self {
            config,
            state: SessionState::Idle,
            duration,
            active_secs: duration.secs(),
            timer: Timer::new(),
            words: Vec::new(),
            transcript: Vec::new(),
            error_set: BTreeSet::new(),
            input: String::new(),
            correct_words: 0,
            generation: 0,
            fetch_in_flight: false,
            last_fetch_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn duration(&self) -> TestDuration {
        self.duration
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    pub fn error_set(&self) -> &BTreeSet<String> {
        &self.error_set
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn correct_words(&self) -> usize {
        self.correct_words
    }

    pub fn completed_words(&self) -> usize {
        self.transcript.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_fetching(&self) -> bool {
        self.fetch_in_flight
    }

    pub fn last_fetch_error(&self) -> Option<&str> {
        self.last_fetch_error.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    /// Seconds left on the clock as the user sees it
    pub fn remaining_secs(&self) -> u64 {
        match self.state {
            SessionState::Idle => self.duration.secs(),
            SessionState::Running => self.timer.remaining(),
            SessionState::Finished => 0,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        match self.state {
            SessionState::Idle => 0,
            _ => self.active_secs.saturating_sub(self.remaining_secs()),
        }
    }

    /// Completed words per elapsed minute; 0 before the first second passes
    pub fn wpm(&self) -> f64 {
        let elapsed = self.elapsed_secs();
        if elapsed == 0 {
            return 0.0;
        }
        self.completed_words() as f64 * 60.0 / elapsed as f64
    }

    /// Percentage of completed words that matched their target
    pub fn accuracy(&self) -> u32 {
        let completed = self.completed_words();
        if completed == 0 {
            return 0;
        }
        ((self.correct_words as f64 / completed as f64) * 100.0).round() as u32
    }

    pub fn word_mark(&self, index: usize) -> WordMark {
        let typed = self.transcript.len();
        if index == typed {
            return WordMark::Current;
        }
        if index > typed {
            return WordMark::Pending;
        }

        let attempt = &self.transcript[index];
        if self.words.get(index) == Some(attempt) {
            WordMark::Correct
        } else if self.error_set.contains(attempt) {
            WordMark::Incorrect
        } else {
            WordMark::Unmarked
        }
    }

    /// Only allowed between sessions
    pub fn select_duration(&mut self, duration: TestDuration) -> bool {
        if self.is_running() {
            return false;
        }
        self.duration = duration;
        true
    }

    /// Begin a new session from Idle or Finished
    pub fn start(&mut self) -> Option<FetchRequest> {
        if self.is_running() {
            log::debug!("start ignored, session already running");
            return None;
        }
        Some(self.begin())
    }

    /// Abandon the running session and begin a new one with the selected duration
    pub fn restart(&mut self) -> Option<FetchRequest> {
        if !self.is_running() {
            log::debug!("restart ignored in state {}", self.state);
            return None;
        }
        self.timer.stop();
        Some(self.begin())
    }

    fn begin(&mut self) -> FetchRequest {
        self.generation += 1;
        self.transcript.clear();
        self.error_set.clear();
        self.input.clear();
        self.correct_words = 0;
        self.last_fetch_error = None;
        self.active_secs = self.duration.secs();
        self.timer.start(self.active_secs);
        self.state = SessionState::Running;
        self.fetch_in_flight = true;

        log::info!(
            "session {} started for {}",
            self.generation,
            self.duration
        );

        FetchRequest {
            generation: self.generation,
            count: self.config.word_count,
            kind: FetchKind::Replace,
        }
    }

    /// One second elapsed
    pub fn tick(&mut self) -> TimerSignal {
        if !self.is_running() {
            return TimerSignal::Idle;
        }

        let signal = self.timer.tick();
        if signal == TimerSignal::Expired {
            self.state = SessionState::Finished;
            log::info!(
                "session {} finished: {} words, {:.1} wpm, {}% accuracy",
                self.generation,
                self.completed_words(),
                self.wpm(),
                self.accuracy()
            );
        }
        signal
    }

    /// The text field changed to `value`. A trailing space submits the word.
    pub fn input_changed(&mut self, value: &str) -> Option<Submission> {
        if !self.is_running() {
            return None;
        }

        self.input = value.to_string();
        if value.ends_with(' ') {
            Some(self.submit_word(value))
        } else {
            None
        }
    }

    pub fn type_char(&mut self, c: char) -> Option<Submission> {
        let mut value = self.input.clone();
        value.push(c);
        self.input_changed(&value)
    }

    pub fn submit_word(&mut self, raw: &str) -> Submission {
        if !self.is_running() {
            return Submission::Ignored(IgnoreReason::NotRunning);
        }

        let submitted = raw.trim();
        if submitted.is_empty() {
            self.input.clear();
            return Submission::Ignored(IgnoreReason::Empty);
        }

        let Some(target) = self.words.get(self.transcript.len()) else {
            self.input = submitted.to_string();
            return Submission::Ignored(IgnoreReason::OutOfWords);
        };

        let correct = submitted == target;
        if correct {
            self.correct_words += 1;
            self.error_set.remove(submitted);
        } else if !self.error_set.contains(submitted) {
            self.error_set.insert(submitted.to_string());
        }

        self.transcript.push(submitted.to_string());
        self.input.clear();

        Submission::Accepted { correct }
    }

    /// Take back the last attempt and put its text in the input buffer
    pub fn correct_last_word(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(popped) = self.transcript.pop() else {
            return false;
        };

        if self.config.correction == CorrectionPolicy::Rescore
            && self.words.get(self.transcript.len()) == Some(&popped)
        {
            self.correct_words = self.correct_words.saturating_sub(1);
        }
        self.correct_words = self.correct_words.min(self.transcript.len());

        self.input = popped;
        true
    }

    pub fn backspace(&mut self) {
        if !self.is_running() {
            return;
        }
        if self.input.is_empty() {
            self.correct_last_word();
        } else {
            self.input.pop();
        }
    }

    /// Completion of a fetch issued for session `generation`.
    /// Returns true if the words were taken.
    pub fn words_fetched(
        &mut self,
        generation: u64,
        kind: FetchKind,
        result: Result<Vec<String>, FetchError>,
    ) -> bool {
        if generation != self.generation {
            log::debug!(
                "discarding fetch for session {generation}, current is {}",
                self.generation
            );
            return false;
        }
        self.fetch_in_flight = false;

        match result {
            Ok(words) => {
                log::info!(
                    "session {generation}: received {} words ({kind:?})",
                    words.len()
                );
                if kind == FetchKind::Replace {
                    // keep targets already judged so attempts stay aligned
                    self.words.truncate(self.transcript.len());
                }
                self.words.extend(words);
                self.last_fetch_error = None;
                true
            }
            Err(err) => {
                log::warn!("session {generation}: word fetch failed: {err}");
                self.last_fetch_error = Some(err.to_string());
                false
            }
        }
    }

    /// Top-up fetch when the untyped supply runs low
    pub fn refill_request(&mut self) -> Option<FetchRequest> {
        if !self.is_running() || self.fetch_in_flight || self.last_fetch_error.is_some() {
            return None;
        }

        let untyped = self.words.len().saturating_sub(self.transcript.len());
        if untyped >= self.config.refill_threshold {
            return None;
        }

        self.fetch_in_flight = true;
        log::debug!(
            "session {}: {untyped} words left, requesting more",
            self.generation
        );
        Some(FetchRequest {
            generation: self.generation,
            count: self.config.word_count,
            kind: FetchKind::Append,
        })
    }
}
