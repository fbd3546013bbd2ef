//! shared fakes for the engine's tests: deterministic timestamps, an
//! in-memory store backing, and recording/failing side-effect collaborators.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::alarm::Alarm;
use crate::notify::Notifier;
use crate::sound::SoundOutput;
use crate::store::Persistence;
use crate::SideEffectError;

/// a fixed local timestamp; panics on nonsense input, which in a test is
/// exactly what we want
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

/// persistence collaborator that keeps the saved list in shared memory so
/// tests can watch every save as it happens
#[derive(Debug, Default, Clone)]
pub struct MemoryPersistence {
    contents: Rc<RefCell<Vec<Alarm>>>,
}

impl MemoryPersistence {
    pub fn with_alarms(alarms: Vec<Alarm>) -> Self {
        Self {
            contents: Rc::new(RefCell::new(alarms)),
        }
    }

    pub fn saved(&self) -> Vec<Alarm> {
        self.contents.borrow().clone()
    }
}

impl Persistence for MemoryPersistence {
    fn load(&mut self) -> Vec<Alarm> {
        self.contents.borrow().clone()
    }

    fn save(&mut self, alarms: &[Alarm]) {
        *self.contents.borrow_mut() = alarms.to_vec();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SoundCall {
    Play { sound: String, alarm_id: u64 },
    Stop,
}

/// sound collaborator that only remembers what it was asked to do
#[derive(Debug, Default, Clone)]
pub struct RecordingSound {
    pub calls: Rc<RefCell<Vec<SoundCall>>>,
}

impl RecordingSound {
    pub fn plays(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, SoundCall::Play { .. }))
            .count()
    }

    pub fn stops(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, SoundCall::Stop))
            .count()
    }
}

impl SoundOutput for RecordingSound {
    fn play(&mut self, sound: &str, _volume: f32, alarm_id: u64) -> Result<(), SideEffectError> {
        self.calls.borrow_mut().push(SoundCall::Play {
            sound: sound.to_string(),
            alarm_id,
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SideEffectError> {
        self.calls.borrow_mut().push(SoundCall::Stop);
        Ok(())
    }
}

/// sound collaborator whose every call fails, for the error-swallowing tests
#[derive(Debug, Default)]
pub struct BrokenSound;

impl SoundOutput for BrokenSound {
    fn play(&mut self, _sound: &str, _volume: f32, _alarm_id: u64) -> Result<(), SideEffectError> {
        Err("speaker on fire".into())
    }

    fn stop(&mut self) -> Result<(), SideEffectError> {
        Err("speaker on fire".into())
    }
}

#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    pub shown: Rc<RefCell<Vec<(String, String)>>>,
}

impl Notifier for RecordingNotifier {
    fn show(&mut self, title: &str, body: &str) -> Result<(), SideEffectError> {
        self.shown
            .borrow_mut()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}
