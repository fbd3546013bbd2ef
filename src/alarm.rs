use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::Sound;

#[inline]
#[must_use]
pub const fn always_true() -> bool {
    true
}

#[must_use]
pub const fn default_volume() -> f32 {
    100.0
}

/// how often an alarm comes back after its time of day matches
#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    /// fires at most once and is then removed from the store
    #[default]
    Once,
    Daily,
    Weekdays,
    Weekends,
}

impl Repeat {
    /// whether `day` is eligible for this repeat pattern
    /// (the time-of-day match is the alarm's job, not ours)
    #[must_use]
    pub fn matches_day(self, day: Weekday) -> bool {
        let weekend = matches!(day, Weekday::Sat | Weekday::Sun);
        match self {
            Self::Once | Self::Daily => true,
            Self::Weekdays => !weekend,
            Self::Weekends => weekend,
        }
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Once => "once",
                Self::Daily => "daily",
                Self::Weekdays => "weekdays",
                Self::Weekends => "weekends",
            }
        )
    }
}

impl FromStr for Repeat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "once" => Ok(Self::Once),
            "daily" => Ok(Self::Daily),
            "weekdays" => Ok(Self::Weekdays),
            "weekends" => Ok(Self::Weekends),
            _ => Err(format!(
                "unknown repeat {s:?} (expected once, daily, weekdays or weekends)"
            )),
        }
    }
}

/// a persisted alarm rule: a local wall-clock time of day plus a repeat
/// pattern. `sound` and `volume` only affect playback, never matching.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Alarm {
    pub id: u64,
    pub hour: u8,
    pub minute: u8,
    #[serde(default = "always_true")]
    pub enabled: bool,
    #[serde(default)]
    pub repeat: Repeat,
    pub label: Option<String>,
    #[serde(default = "Sound::default_name")]
    pub sound: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl Alarm {
    /// decides whether this alarm must start ringing at exactly `now`.
    ///
    /// evaluated only at second 0 so a 1 Hz driving loop fires once per
    /// matching minute. if the loop is delayed past second 0 the alarm is
    /// silently missed for that minute; that imprecision is accepted.
    ///
    /// pure: no state is read besides `self` and `now`, nothing is written.
    #[must_use]
    pub fn should_fire(&self, now: &NaiveDateTime) -> bool {
        if !self.enabled || now.second() != 0 {
            return false;
        }
        if now.hour() != u32::from(self.hour) || now.minute() != u32::from(self.minute) {
            return false;
        }
        self.repeat.matches_day(now.weekday())
    }

    /// display label with the fallback used everywhere an alarm is shown
    #[must_use]
    pub fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or("alarm")
    }
}

/// collects alarm fields from user input before an id is assigned.
/// `build` clamps out-of-range times instead of failing: validating input
/// is the caller's job, the engine just refuses to hold an invalid alarm.
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmBuilder {
    pub name: Option<String>,
    pub hour: u8,
    pub minute: u8,
    pub repeat: Repeat,
    pub sound: String,
    pub volume: f32,
}

impl Default for AlarmBuilder {
    fn default() -> Self {
        Self {
            name: None,
            hour: 0,
            minute: 0,
            repeat: Repeat::default(),
            sound: Sound::default_name(),
            volume: default_volume(),
        }
    }
}

impl AlarmBuilder {
    #[must_use]
    pub fn at(hour: u8, minute: u8) -> Self {
        Self {
            hour,
            minute,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(mut self, name: Option<String>) -> Self {
        self.name = name.filter(|n| !n.is_empty());
        self
    }

    #[must_use]
    pub const fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    #[must_use]
    pub fn sound(mut self, sound: String) -> Self {
        self.sound = sound;
        self
    }

    #[must_use]
    pub const fn volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    #[must_use]
    pub fn build(self, id: u64) -> Alarm {
        Alarm {
            id,
            hour: self.hour.clamp(0, 23),
            minute: self.minute.clamp(0, 59),
            enabled: true,
            repeat: self.repeat,
            label: self.name,
            sound: self.sound,
            volume: self.volume.clamp(0.0, 100.0),
        }
    }
}
