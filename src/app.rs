use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::runtime::{spawn_fetch, AppEvent};
use crate::session::{FetchRequest, Session, TestDuration};
use crate::timer::{TickSchedule, TimerSignal};
use crate::word_source::WordSource;

/// Glue between terminal events and the session engine. Owns the tick
/// schedule and dispatches word fetches to worker threads.
pub struct App {
    pub session: Session,
    schedule: TickSchedule,
    source: Arc<dyn WordSource>,
    events: Sender<AppEvent>,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: Session, source: Arc<dyn WordSource>, events: Sender<AppEvent>) -> Self {
        Self {
            session,
            schedule: TickSchedule::default(),
            source,
            events,
            should_quit: false,
        }
    }

    pub fn schedule(&self) -> &TickSchedule {
        &self.schedule
    }

    pub fn handle_event(&mut self, event: AppEvent, now: Instant) {
        // a tick that is already due ends the session before this event counts
        self.poll_ticks(now);

        match event {
            AppEvent::Key(key) => self.on_key(key, now),
            AppEvent::Resize | AppEvent::Poll => {}
            AppEvent::WordsFetched {
                generation,
                kind,
                result,
            } => {
                self.session.words_fetched(generation, kind, result);
            }
        }

        self.poll_ticks(now);
        if let Some(request) = self.session.refill_request() {
            self.dispatch(request);
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            self.should_quit = true;
            return;
        }

        if self.session.is_running() {
            match key.code {
                KeyCode::Char(c)
                    if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() =>
                {
                    self.session.type_char(c);
                }
                KeyCode::Backspace => self.session.backspace(),
                KeyCode::Tab => self.restart(now),
                _ => {}
            }
            return;
        }

        let selected = self.session.duration();
        match key.code {
            KeyCode::Enter => self.start(now),
            KeyCode::Char('1') => {
                self.session.select_duration(TestDuration::Short);
            }
            KeyCode::Char('2') => {
                self.session.select_duration(TestDuration::Medium);
            }
            KeyCode::Char('3') => {
                self.session.select_duration(TestDuration::Long);
            }
            KeyCode::Left => {
                self.session.select_duration(selected.prev());
            }
            KeyCode::Right => {
                self.session.select_duration(selected.next());
            }
            _ => {}
        }
    }

    pub fn start(&mut self, now: Instant) {
        if let Some(request) = self.session.start() {
            self.schedule.start(now);
            self.dispatch(request);
        }
    }

    pub fn restart(&mut self, now: Instant) {
        if let Some(request) = self.session.restart() {
            self.schedule.start(now);
            self.dispatch(request);
        }
    }

    /// Feed every whole second that passed since the last poll to the session
    pub fn poll_ticks(&mut self, now: Instant) {
        for _ in 0..self.schedule.due_ticks(now) {
            if self.session.tick() == TimerSignal::Expired {
                self.schedule.stop();
                break;
            }
        }
    }

    fn dispatch(&self, request: FetchRequest) {
        spawn_fetch(Arc::clone(&self.source), request, self.events.clone());
    }
}
