use chrono::NaiveDateTime;

/// where the scheduler's driving loop gets "now" from.
/// kept behind a trait so tests can hand the engine fixed timestamps.
pub trait ClockSource {
    fn now(&self) -> NaiveDateTime;
}

/// the real thing: local wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}
