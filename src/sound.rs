use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::Path,
    sync::mpsc::{Receiver, Sender},
    thread,
};

use rodio::{Decoder, OutputStreamHandle, Sink, Source};

use crate::{
    communication::{Message, MessageType},
    config::Sound,
    SideEffectError,
};

/// the tone-playback boundary. `stop` silences everything at once and is a
/// no-op when nothing is playing.
pub trait SoundOutput {
    fn play(&mut self, sound: &str, volume: f32, alarm_id: u64) -> Result<(), SideEffectError>;
    fn stop(&mut self) -> Result<(), SideEffectError>;
}

/// production [`SoundOutput`]: resolves sound names against the configured
/// library and hands the playback thread a message per ring
pub struct ChannelSound {
    sender: Sender<Message>,
    sounds: HashMap<String, Sound>,
}

impl ChannelSound {
    #[must_use]
    pub const fn new(sender: Sender<Message>, sounds: HashMap<String, Sound>) -> Self {
        Self { sender, sounds }
    }
}

impl SoundOutput for ChannelSound {
    fn play(&mut self, sound: &str, volume: f32, alarm_id: u64) -> Result<(), SideEffectError> {
        let sound = self
            .sounds
            .get(sound)
            .ok_or_else(|| format!("no sound named {sound:?} in the library"))?;
        self.sender
            .send(Message::new(
                MessageType::AlarmTriggered {
                    volume,
                    sound_path: sound.path.clone(),
                },
                alarm_id,
            ))
            .map_err(|_| "playback thread is gone")?;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SideEffectError> {
        self.sender
            .send(Message::new(MessageType::StopAll, 0))
            .map_err(|_| "playback thread is gone")?;
        Ok(())
    }
}

/// spawns the thread that owns the audio output. it dies when every sender
/// is dropped; the engine side never waits on it mid-tick.
pub fn spawn_player(receiver: Receiver<Message>) -> thread::JoinHandle<()> {
    thread::spawn(move || player_loop(&receiver))
}

fn player_loop(receiver: &Receiver<Message>) {
    // the stream must outlive its sinks, keep it for the whole loop
    let Ok((_stream, handle)) = rodio::OutputStream::try_default() else {
        log::error!("no audio output device, alarms will be silent");
        while receiver.recv().is_ok() {}
        return;
    };
    // one looping sink per ringing alarm, so simultaneous alarms stack
    let mut playing: HashMap<u64, Sink> = HashMap::new();
    loop {
        match receiver.recv() {
            Ok(Message {
                kind: MessageType::AlarmTriggered { volume, sound_path },
                alarm_id,
            }) => match start_sink(&handle, &sound_path, volume) {
                Ok(sink) => {
                    log::info!("alarm {alarm_id} ringing with {}", sound_path.display());
                    playing.insert(alarm_id, sink);
                }
                Err(e) => {
                    log::warn!("couldn't play {}: {e}", sound_path.display());
                }
            },
            Ok(Message {
                kind: MessageType::StopAll,
                ..
            }) => {
                for (_, sink) in playing.drain() {
                    sink.stop();
                }
            }
            Err(_) => break,
        }
    }
}

fn start_sink(handle: &OutputStreamHandle, path: &Path, volume: f32) -> Result<Sink, SideEffectError> {
    let file = BufReader::new(File::open(path)?);
    // repeat until told to stop, like any alarm clock worth waking up to
    let source = Decoder::new(file)?.repeat_infinite();
    let sink = Sink::try_new(handle)?;
    sink.set_volume(volume / 100.0);
    sink.append(source);
    sink.play();
    Ok(sink)
}
