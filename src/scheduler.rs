use chrono::NaiveDateTime;

use crate::{
    alarm::{Alarm, Repeat},
    notify::Notifier,
    ring::RingSession,
    snooze,
    sound::SoundOutput,
    store::AlarmStore,
};

/// what the UI boundary sees when it asks how things are going
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    Ringing {
        /// snapshot of the alarm as it was when it started ringing;
        /// the store row may be gone by now
        alarm: Alarm,
        elapsed_seconds: i64,
    },
}

/// the driving loop's state machine: IDLE until a tick matches an alarm,
/// RINGING until the user dismisses or snoozes.
///
/// everything here runs on one thread. a tick evaluates a snapshot of the
/// alarm list taken at tick start; removals earned during the scan are
/// applied after it, never mid-scan.
pub struct Scheduler {
    store: AlarmStore,
    ring: RingSession,
    sound: Box<dyn SoundOutput>,
    notifier: Box<dyn Notifier>,
    snooze_minutes: u32,
}

impl Scheduler {
    #[must_use]
    pub fn new(
        store: AlarmStore,
        sound: Box<dyn SoundOutput>,
        notifier: Box<dyn Notifier>,
        snooze_minutes: u32,
    ) -> Self {
        Self {
            store,
            ring: RingSession::new(),
            sound,
            notifier,
            snooze_minutes,
        }
    }

    /// one evaluation pass, nominally once per second.
    ///
    /// every alarm that matches this tick gets its sound and notification,
    /// even when several match at once; only the first in store order
    /// becomes the ring session. fired `once` alarms are removed after the
    /// scan. a failing side effect is logged and never stops the pass.
    pub fn tick(&mut self, now: NaiveDateTime) {
        let snapshot = self.store.list().to_vec();
        let mut fired_once = Vec::new();
        for alarm in &snapshot {
            if !alarm.should_fire(&now) {
                continue;
            }
            // already the ringing one: only its elapsed time advances
            if self.ring.is_open_for(alarm.id) {
                continue;
            }
            log::info!(
                "alarm {} ({}) fired at {now}",
                alarm.id,
                alarm.label_or_default()
            );
            if let Err(e) = self.sound.play(&alarm.sound, alarm.volume, alarm.id) {
                log::warn!("couldn't start sound for alarm {}: {e}", alarm.id);
            }
            let body = format!("{:02}:{:02}", alarm.hour, alarm.minute);
            if let Err(e) = self.notifier.show(alarm.label_or_default(), &body) {
                log::warn!("couldn't notify for alarm {}: {e}", alarm.id);
            }
            self.ring.open(alarm, now);
            if alarm.repeat == Repeat::Once {
                fired_once.push(alarm.id);
            }
        }
        for id in fired_once {
            self.store.remove(id);
        }
    }

    /// user said stop. true when there was a ring to dismiss; a second
    /// dismiss (or a snooze after it) finds the session closed and does
    /// nothing.
    pub fn dismiss(&mut self) -> bool {
        let Some(ended) = self.ring.close() else {
            return false;
        };
        log::info!("alarm {} dismissed", ended.alarm.id);
        self.stop_sound();
        true
    }

    /// user said later: close the ring and put a fresh one-shot alarm a few
    /// minutes out. answers the new alarm's id, or `None` when nothing was
    /// ringing (e.g. a dismiss won the race).
    pub fn snooze(&mut self, now: NaiveDateTime) -> Option<u64> {
        let ended = self.ring.close()?;
        self.stop_sound();
        let id = self.store.fresh_id();
        let snoozed = snooze::make_snooze(id, &now, self.snooze_minutes, &ended.alarm);
        log::info!(
            "alarm {} snoozed until {:02}:{:02}",
            ended.alarm.id,
            snoozed.hour,
            snoozed.minute
        );
        self.store.add(snoozed);
        Some(id)
    }

    #[must_use]
    pub fn status(&self, now: NaiveDateTime) -> Status {
        match (self.ring.current(), self.ring.elapsed_seconds(now)) {
            (Some(alarm), Some(elapsed_seconds)) => Status::Ringing {
                alarm: alarm.clone(),
                elapsed_seconds,
            },
            _ => Status::Idle,
        }
    }

    /// stop ticking for good: close any open ring and silence the sound
    /// collaborator so teardown never leaves a tone playing
    pub fn shutdown(&mut self) {
        if let Some(ended) = self.ring.close() {
            log::info!("shutting down while alarm {} was ringing", ended.alarm.id);
        }
        self.stop_sound();
    }

    /// the alarm list for the UI boundary to read
    #[must_use]
    pub fn store(&self) -> &AlarmStore {
        &self.store
    }

    /// the single mutation path for user commands (add/edit/delete/toggle);
    /// safe because commands and ticks are serialized on one thread
    pub fn store_mut(&mut self) -> &mut AlarmStore {
        &mut self.store
    }

    fn stop_sound(&mut self) {
        if let Err(e) = self.sound.stop() {
            log::warn!("couldn't stop sound: {e}");
        }
    }
}
