use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::alarm::{Alarm, Repeat};

/// storage backing for the alarm list.
/// `load` must come back with an empty list rather than fail on a missing
/// or corrupt store; `save` is best-effort.
pub trait Persistence {
    fn load(&mut self) -> Vec<Alarm>;
    fn save(&mut self, alarms: &[Alarm]);
}

/// alarms serialized as a `[[alarms]]` table array in one toml file
#[derive(Debug, Serialize, Deserialize, Default)]
struct AlarmsFile {
    alarms: Vec<Alarm>,
}

/// the production [`Persistence`]: a toml file in the config directory
#[derive(Debug)]
pub struct TomlFile {
    path: PathBuf,
}

impl TomlFile {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Persistence for TomlFile {
    fn load(&mut self) -> Vec<Alarm> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                log::info!("no alarm file at {}: {e}", self.path.display());
                return Vec::new();
            }
        };
        match toml::from_str::<AlarmsFile>(&contents) {
            Ok(file) => file.alarms,
            Err(e) => {
                log::warn!("couldn't parse alarm file {}: {e}", self.path.display());
                Vec::new()
            }
        }
    }

    fn save(&mut self, alarms: &[Alarm]) {
        let file = AlarmsFile {
            alarms: alarms.to_vec(),
        };
        let contents = match toml::to_string(&file) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("couldn't serialize alarms: {e}");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!("couldn't create alarm dir {}: {e}", parent.display());
                return;
            }
        }
        if let Err(e) = std::fs::write(&self.path, contents) {
            log::warn!("couldn't write alarm file {}: {e}", self.path.display());
        }
    }
}

/// a single field change to an existing alarm, identity preserved
#[derive(Debug, Clone, PartialEq)]
pub enum AlarmEdit {
    Time { hour: u8, minute: u8 },
    Label(Option<String>),
    Repeat(Repeat),
    Sound(String),
    Volume(f32),
    Enable(bool),
}

/// the alarm list, in insertion order, plus the id source.
///
/// this is the only place the list is ever mutated, and every mutation is
/// handed to the [`Persistence`] collaborator before the call returns, so
/// a crash right after a mutating call never loses it.
pub struct AlarmStore {
    alarms: Vec<Alarm>,
    next_id: u64,
    persist: Box<dyn Persistence>,
}

impl AlarmStore {
    /// loads whatever the collaborator has and seeds the id counter past it
    #[must_use]
    pub fn load(mut persist: Box<dyn Persistence>) -> Self {
        let alarms = persist.load();
        let next_id = alarms.iter().map(|a| a.id).max().map_or(1, |max| max + 1);
        Self {
            alarms,
            next_id,
            persist,
        }
    }

    #[must_use]
    pub fn list(&self) -> &[Alarm] {
        &self.alarms
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Alarm> {
        self.alarms.iter().find(|a| a.id == id)
    }

    /// ids are handed out once and never repeated for the store's lifetime,
    /// snoozed alarms included
    pub fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// an alarm at the same time with the same repeat already exists.
    /// quick-add flows refuse such duplicates at creation time.
    #[must_use]
    pub fn conflicts(&self, hour: u8, minute: u8, repeat: Repeat) -> bool {
        self.alarms
            .iter()
            .any(|a| a.hour == hour && a.minute == minute && a.repeat == repeat)
    }

    /// # Panics
    /// if `alarm.id` is already present. ids come from [`Self::fresh_id`],
    /// so a collision is a caller bug, not a runtime condition.
    pub fn add(&mut self, alarm: Alarm) {
        assert!(
            !self.alarms.iter().any(|a| a.id == alarm.id),
            "duplicate alarm id {}",
            alarm.id
        );
        self.next_id = self.next_id.max(alarm.id + 1);
        self.alarms.push(alarm);
        self.save();
    }

    /// applies one field edit; false when no alarm has that id
    pub fn update(&mut self, id: u64, edit: AlarmEdit) -> bool {
        let Some(alarm) = self.alarms.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        match edit {
            AlarmEdit::Time { hour, minute } => {
                alarm.hour = hour.clamp(0, 23);
                alarm.minute = minute.clamp(0, 59);
            }
            AlarmEdit::Label(label) => alarm.label = label,
            AlarmEdit::Repeat(repeat) => alarm.repeat = repeat,
            AlarmEdit::Sound(sound) => alarm.sound = sound,
            AlarmEdit::Volume(volume) => alarm.volume = volume.clamp(0.0, 100.0),
            AlarmEdit::Enable(enabled) => alarm.enabled = enabled,
        }
        self.save();
        true
    }

    /// false when no alarm has that id (e.g. it was already removed)
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.alarms.len();
        self.alarms.retain(|a| a.id != id);
        let removed = self.alarms.len() != before;
        if removed {
            self.save();
        }
        removed
    }

    pub fn toggle(&mut self, id: u64) -> bool {
        let Some(alarm) = self.alarms.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        alarm.enabled = !alarm.enabled;
        self.save();
        true
    }

    fn save(&mut self) {
        self.persist.save(&self.alarms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::AlarmBuilder;
    use crate::testutil::MemoryPersistence;

    fn empty_store() -> (AlarmStore, MemoryPersistence) {
        let persist = MemoryPersistence::default();
        let store = AlarmStore::load(Box::new(persist.clone()));
        (store, persist)
    }

    #[test]
    fn every_mutation_is_persisted_before_returning() {
        let (mut store, persist) = empty_store();
        let id = store.fresh_id();
        store.add(AlarmBuilder::at(7, 0).build(id));
        assert_eq!(persist.saved().len(), 1);

        store.update(id, AlarmEdit::Time { hour: 8, minute: 15 });
        assert_eq!(persist.saved()[0].hour, 8);

        store.toggle(id);
        assert!(!persist.saved()[0].enabled);

        store.remove(id);
        assert!(persist.saved().is_empty());
    }

    #[test]
    fn update_clamps_and_preserves_identity() {
        let (mut store, _persist) = empty_store();
        let id = store.fresh_id();
        store.add(AlarmBuilder::at(7, 0).build(id));
        assert!(store.update(id, AlarmEdit::Time { hour: 99, minute: 99 }));
        let alarm = store.get(id).unwrap();
        assert_eq!((alarm.id, alarm.hour, alarm.minute), (id, 23, 59));
    }

    #[test]
    fn missing_ids_are_reported_not_fatal() {
        let (mut store, _persist) = empty_store();
        assert!(!store.remove(42));
        assert!(!store.toggle(42));
        assert!(!store.update(42, AlarmEdit::Enable(false)));
    }

    #[test]
    fn fresh_ids_never_collide_with_loaded_ones() {
        let persist = MemoryPersistence::with_alarms(vec![
            AlarmBuilder::at(6, 0).build(3),
            AlarmBuilder::at(7, 0).build(7),
        ]);
        let mut store = AlarmStore::load(Box::new(persist));
        assert_eq!(store.fresh_id(), 8);
        assert_eq!(store.fresh_id(), 9);
    }

    #[test]
    #[should_panic(expected = "duplicate alarm id")]
    fn adding_a_taken_id_is_a_caller_bug() {
        let (mut store, _persist) = empty_store();
        store.add(AlarmBuilder::at(7, 0).build(1));
        store.add(AlarmBuilder::at(8, 0).build(1));
    }

    #[test]
    fn conflicts_only_on_exact_time_and_repeat() {
        let (mut store, _persist) = empty_store();
        store.add(AlarmBuilder::at(7, 30).repeat(Repeat::Daily).build(1));
        assert!(store.conflicts(7, 30, Repeat::Daily));
        assert!(!store.conflicts(7, 30, Repeat::Once));
        assert!(!store.conflicts(7, 31, Repeat::Daily));
    }

    #[test]
    fn memory_round_trip_preserves_alarms() {
        let (mut store, persist) = empty_store();
        for (hour, minute) in [(6, 30), (7, 0), (22, 45)] {
            let id = store.fresh_id();
            store.add(AlarmBuilder::at(hour, minute).build(id));
        }
        let reloaded = AlarmStore::load(Box::new(persist));
        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn toml_round_trip_preserves_alarms() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alarms.toml");
        let alarms = vec![
            AlarmBuilder::at(7, 0)
                .name(Some("work".to_string()))
                .repeat(Repeat::Weekdays)
                .build(1),
            AlarmBuilder::at(10, 30).repeat(Repeat::Weekends).build(2),
        ];
        TomlFile::new(path.clone()).save(&alarms);
        assert_eq!(TomlFile::new(path).load(), alarms);
    }

    #[test]
    fn corrupt_or_missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(TomlFile::new(missing).load().is_empty());

        let corrupt = dir.path().join("alarms.toml");
        std::fs::write(&corrupt, "not even [toml").unwrap();
        assert!(TomlFile::new(corrupt).load().is_empty());
    }
}
