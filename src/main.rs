use std::{
    error::Error,
    io::{self, BufRead},
    path::PathBuf,
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::Duration,
};

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use clap::{command, Parser, Subcommand};
use reveille::{
    config::{Config, Sound},
    notify::LogNotifier,
    sound::{self, ChannelSound},
    store::TomlFile,
    Alarm, AlarmBuilder, AlarmEdit, AlarmStore, ClockSource, Repeat, Scheduler, Status,
    SystemClock,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// write a fresh config and create the sounds directory
    Init {
        #[clap(long, short)]
        force: bool,
    },
    /// register a sound file under a name usable by alarms
    NewSound { name: String, path: PathBuf },
    /// add an alarm, time given as HH:MM (24 hour)
    NewAlarm {
        time: String,
        #[clap(long)]
        name: Option<String>,
        #[clap(long, default_value = "once")]
        repeat: String,
        #[clap(long)]
        sound: Option<String>,
        #[clap(long, default_value_t = 100.0)]
        volume: f32,
    },
    /// change fields of an existing alarm
    SetAlarm {
        id: u64,
        #[clap(long)]
        time: Option<String>,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        repeat: Option<String>,
        #[clap(long)]
        sound: Option<String>,
        #[clap(long)]
        volume: Option<f32>,
        #[clap(long)]
        enabled: Option<bool>,
    },
    /// list the stored alarms
    Alarms,
    RemoveAlarm { id: u64 },
    ToggleAlarm { id: u64 },
    /// tick the scheduler once a second until told to quit
    Run,
}

fn main() -> Result<(), Box<dyn Error>> {
    // initialize the logger
    simple_file_logger::init_logger!("reveille").expect("couldn't initialize logger");

    let args = Args::parse();
    match args.command {
        Some(Command::Init { force }) => {
            init(force);
            Ok(())
        }
        Some(Command::NewSound { name, path }) => {
            new_sound(name, path);
            Ok(())
        }
        Some(Command::NewAlarm {
            time,
            name,
            repeat,
            sound,
            volume,
        }) => new_alarm(&time, name, &repeat, sound, volume),
        Some(Command::SetAlarm {
            id,
            time,
            name,
            repeat,
            sound,
            volume,
            enabled,
        }) => set_alarm(id, time, name, repeat, sound, volume, enabled),
        Some(Command::Alarms) => {
            list_alarms();
            Ok(())
        }
        Some(Command::RemoveAlarm { id }) => {
            let mut store = open_store();
            if store.remove(id) {
                println!("alarm {id} removed");
            } else {
                println!("no alarm {id}");
            }
            Ok(())
        }
        Some(Command::ToggleAlarm { id }) => {
            let mut store = open_store();
            if store.toggle(id) {
                let enabled = store.get(id).is_some_and(|a| a.enabled);
                println!("alarm {id} {}", if enabled { "enabled" } else { "disabled" });
            } else {
                println!("no alarm {id}");
            }
            Ok(())
        }
        Some(Command::Run) | None => run(),
    }
}

fn open_store() -> AlarmStore {
    AlarmStore::load(Box::new(TomlFile::new(Config::alarms_path())))
}

fn init(force: bool) {
    if force || !Config::is_config_present() {
        Config::new().save(&Config::config_path());
        if let Err(e) = std::fs::create_dir_all(Config::sounds_path()) {
            log::warn!("couldn't create sounds dir: {e}");
        }
        println!(
            "config written to {}\nput alarm sound files (ring.mp3, beep_beep.mp3, ...) in {}",
            Config::config_path().display(),
            Config::sounds_path().display()
        );
    } else {
        println!("config already present, pass --force to overwrite");
    }
}

fn new_sound(name: String, path: PathBuf) {
    let config_path = Config::config_path();
    let mut config = Config::load(&config_path);
    if !path.exists() {
        println!("warning: {} does not exist yet", path.display());
    }
    config
        .sounds
        .sounds
        .insert(name.clone(), Sound::new(name, path));
    config.save(&config_path);
}

#[allow(clippy::cast_possible_truncation)]
fn new_alarm(
    time: &str,
    name: Option<String>,
    repeat: &str,
    sound: Option<String>,
    volume: f32,
) -> Result<(), Box<dyn Error>> {
    let config = Config::load(&Config::config_path());
    let time = NaiveTime::parse_from_str(time, "%H:%M")?;
    let repeat = repeat.parse::<Repeat>()?;
    let (hour, minute) = (time.hour() as u8, time.minute() as u8);

    let mut store = open_store();
    // quick-add refuses exact duplicates, the engine tolerates them anyway
    if store.conflicts(hour, minute, repeat) {
        println!("an alarm at {time} repeating {repeat} already exists");
        return Ok(());
    }
    let sound = sound.unwrap_or_else(|| config.sounds.default_sound.clone());
    if !config.sounds.sounds.contains_key(&sound) {
        println!("no sound named {sound:?}, register it with new-sound first");
        return Ok(());
    }

    let id = store.fresh_id();
    store.add(
        AlarmBuilder::at(hour, minute)
            .name(name)
            .repeat(repeat)
            .sound(sound)
            .volume(volume)
            .build(id),
    );
    println!("alarm {id} set for {}", time.format(&config.time_format));
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn set_alarm(
    id: u64,
    time: Option<String>,
    name: Option<String>,
    repeat: Option<String>,
    sound: Option<String>,
    volume: Option<f32>,
    enabled: Option<bool>,
) -> Result<(), Box<dyn Error>> {
    let mut edits = Vec::new();
    if let Some(time) = time {
        let time = NaiveTime::parse_from_str(&time, "%H:%M")?;
        edits.push(AlarmEdit::Time {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        });
    }
    if let Some(name) = name {
        edits.push(AlarmEdit::Label(Some(name).filter(|n| !n.is_empty())));
    }
    if let Some(repeat) = repeat {
        edits.push(AlarmEdit::Repeat(repeat.parse::<Repeat>()?));
    }
    if let Some(sound) = sound {
        edits.push(AlarmEdit::Sound(sound));
    }
    if let Some(volume) = volume {
        edits.push(AlarmEdit::Volume(volume));
    }
    if let Some(enabled) = enabled {
        edits.push(AlarmEdit::Enable(enabled));
    }
    if edits.is_empty() {
        println!("nothing to change");
        return Ok(());
    }

    let mut store = open_store();
    for edit in edits {
        if !store.update(id, edit) {
            println!("no alarm {id}");
            return Ok(());
        }
    }
    println!("alarm {id} updated");
    Ok(())
}

fn list_alarms() {
    let config = Config::load(&Config::config_path());
    let store = open_store();
    if store.list().is_empty() {
        println!("no alarms");
        return;
    }
    for alarm in store.list() {
        println!("{}", render_alarm(alarm, &config.time_format));
    }
}

fn render_alarm(alarm: &Alarm, time_format: &str) -> String {
    let time = NaiveTime::from_hms_opt(u32::from(alarm.hour), u32::from(alarm.minute), 0)
        .unwrap_or_default();
    format!(
        "[{}] {} {} ({}, sound: {}{})",
        alarm.id,
        time.format(time_format),
        alarm.label_or_default(),
        alarm.repeat,
        alarm.sound,
        if alarm.enabled { "" } else { ", disabled" }
    )
}

enum UserCommand {
    Dismiss,
    Snooze,
    Quit,
}

/// reads dismiss/snooze/quit lines off stdin so the tick loop never blocks
/// on the terminal
fn spawn_command_reader() -> Receiver<UserCommand> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let command = match line.trim() {
                "d" | "dismiss" => UserCommand::Dismiss,
                "s" | "snooze" => UserCommand::Snooze,
                "q" | "quit" => UserCommand::Quit,
                "" => continue,
                other => {
                    println!("unknown command {other:?} (d, s or q)");
                    continue;
                }
            };
            if tx.send(command).is_err() {
                break;
            }
        }
    });
    rx
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = Config::load(&Config::config_path());
    let store = open_store();

    let (tx, rx) = mpsc::channel();
    let player = sound::spawn_player(rx);
    let mut scheduler = Scheduler::new(
        store,
        Box::new(ChannelSound::new(tx, config.sounds.sounds.clone())),
        Box::new(LogNotifier::new(config.notifications)),
        config.snooze_minutes,
    );

    let clock = SystemClock;
    let commands = spawn_command_reader();
    println!(
        "reveille watching {} alarm(s): [d]ismiss  [s]nooze  [q]uit",
        scheduler.store().list().len()
    );

    let mut last_tick: Option<NaiveDateTime> = None;
    loop {
        // user commands between ticks; the timeout sets the tick resolution
        match commands.recv_timeout(Duration::from_millis(250)) {
            Ok(UserCommand::Dismiss) => {
                if scheduler.dismiss() {
                    println!("dismissed");
                }
            }
            Ok(UserCommand::Snooze) => {
                if let Some(id) = scheduler.snooze(clock.now()) {
                    if let Some(alarm) = scheduler.store().get(id) {
                        println!("snoozed until {:02}:{:02}", alarm.hour, alarm.minute);
                    }
                }
            }
            Ok(UserCommand::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let now = clock.now();
        let second = now.with_nanosecond(0).unwrap_or(now);
        if last_tick != Some(second) {
            scheduler.tick(second);
            if let Status::Ringing {
                alarm,
                elapsed_seconds,
            } = scheduler.status(second)
            {
                println!("{} ringing for {elapsed_seconds}s", alarm.label_or_default());
            }
            last_tick = Some(second);
        }
    }

    scheduler.shutdown();
    // dropping the scheduler drops the channel sender, which ends the player
    drop(scheduler);
    let _ = player.join();
    Ok(())
}
