#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

pub mod alarm;
pub mod clock;
pub mod communication;
pub mod config;
pub mod notify;
pub mod ring;
pub mod scheduler;
pub mod snooze;
pub mod sound;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use alarm::{Alarm, AlarmBuilder, Repeat};
pub use clock::{ClockSource, SystemClock};
pub use scheduler::{Scheduler, Status};
pub use store::{AlarmEdit, AlarmStore, Persistence};

/// error type for the sound/notification side effects.
/// the scheduler never propagates these, it logs them and keeps ticking.
pub type SideEffectError = Box<dyn std::error::Error + Send + Sync>;
