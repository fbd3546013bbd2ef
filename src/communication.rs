use std::path::PathBuf;

/// what the engine side sends to the playback thread
pub struct Message {
    pub kind: MessageType,
    pub alarm_id: u64,
}

impl Message {
    #[must_use]
    pub const fn new(kind: MessageType, alarm_id: u64) -> Self {
        Self { kind, alarm_id }
    }
}

#[derive(Debug, Clone)]
pub enum MessageType {
    AlarmTriggered { volume: f32, sound_path: PathBuf },
    // dismissed, snoozed or torn down: silence everything
    StopAll,
}
