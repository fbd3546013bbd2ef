use chrono::{Duration, NaiveDateTime, Timelike};

use crate::alarm::{Alarm, Repeat};

/// builds the one-shot alarm created when a ringing alarm is snoozed.
///
/// plain wall-clock addition: the target time wraps around midnight, so
/// snoozing at 23:58 for 5 minutes yields a `once` alarm at 00:03 which
/// fires at the next occurrence of 00:03 local time. the alarm only stores
/// hour and minute, so the day rollover needs no representation at all.
///
/// `id` must come from the store's id source; the caller is responsible
/// for inserting the result into the store.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn make_snooze(id: u64, now: &NaiveDateTime, minutes_ahead: u32, source: &Alarm) -> Alarm {
    let target = now.time() + Duration::minutes(i64::from(minutes_ahead));
    Alarm {
        id,
        // hour() < 24 and minute() < 60, the casts cannot truncate
        hour: target.hour() as u8,
        minute: target.minute() as u8,
        enabled: true,
        repeat: Repeat::Once,
        label: Some(format!("{} (snoozed)", source.label_or_default())),
        sound: source.sound.clone(),
        volume: source.volume,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::AlarmBuilder;
    use crate::testutil::at;

    #[test]
    fn snooze_lands_minutes_ahead() {
        let source = AlarmBuilder::at(7, 0).build(1);
        let snoozed = make_snooze(2, &at(2026, 8, 5, 7, 0, 42), 5, &source);
        assert_eq!((snoozed.hour, snoozed.minute), (7, 5));
        assert_eq!(snoozed.repeat, Repeat::Once);
        assert!(snoozed.enabled);
        assert_eq!(snoozed.id, 2);
    }

    #[test]
    fn snooze_wraps_past_midnight() {
        let source = AlarmBuilder::at(23, 58).build(1);
        let snoozed = make_snooze(2, &at(2026, 8, 5, 23, 58, 30), 5, &source);
        assert_eq!((snoozed.hour, snoozed.minute), (0, 3));
        assert_eq!(snoozed.repeat, Repeat::Once);
    }

    #[test]
    fn snooze_carries_sound_and_marks_label() {
        let source = AlarmBuilder::at(7, 0)
            .name(Some("work".to_string()))
            .sound("rain".to_string())
            .volume(40.0)
            .build(1);
        let snoozed = make_snooze(9, &at(2026, 8, 5, 7, 0, 10), 10, &source);
        assert_eq!(snoozed.label.as_deref(), Some("work (snoozed)"));
        assert_eq!(snoozed.sound, "rain");
        assert!((snoozed.volume - 40.0).abs() < f32::EPSILON);
    }
}
