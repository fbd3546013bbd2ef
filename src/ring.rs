use chrono::NaiveDateTime;

use crate::alarm::Alarm;

/// the alarm currently making noise, as of when it started.
/// this is a snapshot of the store row: a `once` alarm is deleted from the
/// store while it is still ringing, so the session has to keep its own copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Ringing {
    pub alarm: Alarm,
    pub started_at: NaiveDateTime,
}

/// lifecycle of "the alarm currently ringing", at most one at a time.
///
/// `open` while already open for the *same* alarm is idempotent (the
/// driving loop re-evaluates every second and must not reset the ring
/// duration); `open` for a *different* alarm is refused (single concurrent
/// ring); `close` answers `None` the second time (racing dismiss/snooze:
/// first caller wins).
#[derive(Debug, Default)]
pub struct RingSession {
    active: Option<Ringing>,
}

impl RingSession {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn is_open_for(&self, alarm_id: u64) -> bool {
        self.active.as_ref().is_some_and(|r| r.alarm.id == alarm_id)
    }

    /// returns true only when a session was actually opened
    pub fn open(&mut self, alarm: &Alarm, now: NaiveDateTime) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(Ringing {
            alarm: alarm.clone(),
            started_at: now,
        });
        true
    }

    pub fn close(&mut self) -> Option<Ringing> {
        self.active.take()
    }

    #[must_use]
    pub fn current(&self) -> Option<&Alarm> {
        self.active.as_ref().map(|r| &r.alarm)
    }

    /// whole seconds since the ring started, recomputed per tick for display
    #[must_use]
    pub fn elapsed_seconds(&self, now: NaiveDateTime) -> Option<i64> {
        self.active
            .as_ref()
            .map(|r| now.signed_duration_since(r.started_at).num_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::{AlarmBuilder, Repeat};
    use crate::testutil::at;

    fn alarm(id: u64) -> Alarm {
        AlarmBuilder::at(7, 0).repeat(Repeat::Daily).build(id)
    }

    #[test]
    fn open_then_close_round_trip() {
        let mut session = RingSession::new();
        let now = at(2026, 8, 5, 7, 0, 0);
        assert!(session.open(&alarm(1), now));
        assert!(session.is_open());
        assert!(session.is_open_for(1));
        let ended = session.close().unwrap();
        assert_eq!(ended.alarm.id, 1);
        assert!(!session.is_open());
    }

    #[test]
    fn reopen_for_same_alarm_keeps_start_time() {
        let mut session = RingSession::new();
        let started = at(2026, 8, 5, 7, 0, 0);
        assert!(session.open(&alarm(1), started));
        // ticked again with the same matching alarm a second later
        assert!(!session.open(&alarm(1), at(2026, 8, 5, 7, 0, 1)));
        assert_eq!(session.close().unwrap().started_at, started);
    }

    #[test]
    fn second_alarm_cannot_steal_an_open_session() {
        let mut session = RingSession::new();
        let now = at(2026, 8, 5, 7, 0, 0);
        assert!(session.open(&alarm(1), now));
        assert!(!session.open(&alarm(2), now));
        assert!(session.is_open_for(1));
        assert!(!session.is_open_for(2));
    }

    #[test]
    fn close_twice_answers_none() {
        let mut session = RingSession::new();
        session.open(&alarm(1), at(2026, 8, 5, 7, 0, 0));
        assert!(session.close().is_some());
        assert!(session.close().is_none());
    }

    #[test]
    fn elapsed_counts_whole_seconds() {
        let mut session = RingSession::new();
        session.open(&alarm(1), at(2026, 8, 5, 7, 0, 0));
        assert_eq!(session.elapsed_seconds(at(2026, 8, 5, 7, 0, 0)), Some(0));
        assert_eq!(session.elapsed_seconds(at(2026, 8, 5, 7, 0, 12)), Some(12));
        assert_eq!(session.elapsed_seconds(at(2026, 8, 5, 7, 1, 30)), Some(90));
        session.close();
        assert_eq!(session.elapsed_seconds(at(2026, 8, 5, 7, 2, 0)), None);
    }
}
