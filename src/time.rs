use smallvec::SmallVec;
use std::time::{Duration, Instant};

pub struct Time {
    start: Instant,
    last: Instant,
    pub delta: Duration,
}
impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self { start: now, last: now, delta: Duration::from_secs_f32(0.0) }
    }
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last;
        self.last = now;
    }
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
    pub fn elapsed_seconds(&self) -> f32 {
        self.last.duration_since(self.start).as_secs_f32()
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

/// The two countdown timers that drive automatic state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// No pointer activity while the menu is up; expiry collapses back to idle.
    Inactivity,
    /// The idle call-to-action has sat untouched; expiry shrinks it away.
    AutoHide,
}

impl TimerKind {
    pub fn label(self) -> &'static str {
        match self {
            TimerKind::Inactivity => "inactivity",
            TimerKind::AutoHide => "auto_hide",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    kind: TimerKind,
    deadline: f32,
}

/// Deadline registry polled once per tick by the same loop that drives the
/// animators. Arming a kind replaces any earlier entry of that kind, and
/// cancellation is an explicit removal, so a stale deadline can never fire
/// mid-transition. Each armed entry fires at most once.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    entries: Vec<TimerEntry>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, kind: TimerKind, now: f32, duration: f32) {
        self.cancel(kind);
        self.entries.push(TimerEntry { kind, deadline: now + duration.max(0.0) });
    }

    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.kind != kind);
        self.entries.len() != before
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.entries.iter().any(|entry| entry.kind == kind)
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<f32> {
        self.entries.iter().find(|entry| entry.kind == kind).map(|entry| entry.deadline)
    }

    /// Removes and returns every expired entry, in arm order.
    pub fn poll(&mut self, now: f32) -> SmallVec<[TimerKind; 2]> {
        let mut fired = SmallVec::new();
        self.entries.retain(|entry| {
            if entry.deadline <= now {
                fired.push(entry.kind);
                false
            } else {
                true
            }
        });
        fired
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
