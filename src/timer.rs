use std::time::{Duration, Instant};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Running { remaining: u64 },
}

/// What a single tick did to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    /// Tick arrived while stopped; nothing changed
    Idle,
    Ticked { remaining: u64 },
    /// Countdown reached zero on this tick. Emitted once per run.
    Expired,
}

/// Whole-second countdown driving the session lifecycle
#[derive(Debug, Clone)]
pub struct Timer {
    state: TimerState,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Stopped,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    /// Seconds left, or 0 once stopped
    pub fn remaining(&self) -> u64 {
        match self.state {
            TimerState::Running { remaining } => remaining,
            TimerState::Stopped => 0,
        }
    }

    /// (Re)arm the countdown. Any previous run is discarded.
    pub fn start(&mut self, duration_secs: u64) {
        self.state = if duration_secs == 0 {
            TimerState::Stopped
        } else {
            TimerState::Running {
                remaining: duration_secs,
            }
        };
    }

    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
    }

    pub fn tick(&mut self) -> TimerSignal {
        match self.state {
            TimerState::Stopped => TimerSignal::Idle,
            TimerState::Running { remaining } => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.state = TimerState::Stopped;
                    TimerSignal::Expired
                } else {
                    self.state = TimerState::Running { remaining };
                    TimerSignal::Ticked { remaining }
                }
            }
        }
    }
}

/// Converts wall-clock time into discrete one-second ticks.
///
/// There is exactly one due instant per schedule, so re-arming on restart
/// replaces the previous tick stream instead of adding a second one.
#[derive(Debug, Clone)]
pub struct TickSchedule {
    period: Duration,
    next_due: Option<Instant>,
}

impl Default for TickSchedule {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl TickSchedule {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Number of whole periods that elapsed up to `now`. Advances the
    /// schedule by that many periods so no tick is reported twice.
    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };

        let mut ticks = 0;
        while due <= now {
            ticks += 1;
            due += self.period;
        }
        self.next_due = Some(due);
        ticks
    }

    /// Time until the next tick, used to bound how long the runtime blocks
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}
