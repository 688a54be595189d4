//! Audio routing
//!
//! The game never talks to an audio backend directly. Music requests, one-shot
//! effects and bus volumes go through an [`AudioSink`]; the [`Mixer`] keeps
//! the bus levels and [`MusicMap`] decides which track belongs to a state.

use std::collections::HashMap;

use glam::Vec2;

use crate::flow::StateKind;

/// Quietest level a bus can be set to (dB)
pub const MIN_DB: f32 = -80.0;

/// One-shot effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Ball hits a wall or the paddle
    Bounce,
    /// Ball hits a block
    Hit,
    /// Ball lost to the hazard wall
    Death,
}

/// Mixer buses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bus {
    Master,
    Music,
    Sfx,
}

impl Bus {
    pub const ALL: [Bus; 3] = [Bus::Master, Bus::Music, Bus::Sfx];

    pub fn name(&self) -> &'static str {
        match self {
            Bus::Master => "Master",
            Bus::Music => "Music",
            Bus::Sfx => "SFX",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bus| bus.name() == name)
    }
}

/// Audio output backend
pub trait AudioSink {
    fn play_music(&mut self, track: &str);
    fn stop_music(&mut self);
    fn play_effect(&mut self, kind: EffectKind, position: Vec2);
    fn set_bus_volume(&mut self, bus: Bus, db: f32);
}

/// Sink that discards everything (headless runs)
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_music(&mut self, _track: &str) {}
    fn stop_music(&mut self) {}
    fn play_effect(&mut self, _kind: EffectKind, _position: Vec2) {}
    fn set_bus_volume(&mut self, _bus: Bus, _db: f32) {}
}

/// Convert a linear volume (0.0 - 1.0) to decibels
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        return MIN_DB;
    }
    (20.0 * linear.log10()).max(MIN_DB)
}

/// Convert decibels to a linear volume
pub fn db_to_linear(db: f32) -> f32 {
    if db <= MIN_DB {
        return 0.0;
    }
    10f32.powf(db / 20.0)
}

/// Bus volume levels
#[derive(Debug, Clone)]
pub struct Mixer {
    levels: HashMap<Bus, f32>,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mixer {
    pub fn new() -> Self {
        Self {
            levels: Bus::ALL.into_iter().map(|bus| (bus, 0.0)).collect(),
        }
    }

    /// Bus level in dB
    pub fn volume_db(&self, bus: Bus) -> f32 {
        self.levels.get(&bus).copied().unwrap_or(0.0)
    }

    /// Set a bus level in dB and forward it to the sink
    pub fn set_volume_db(&mut self, bus: Bus, db: f32, sink: &mut dyn AudioSink) {
        let db = db.max(MIN_DB);
        self.levels.insert(bus, db);
        sink.set_bus_volume(bus, db);
    }

    /// Set a bus level from a linear slider value
    pub fn set_volume_linear(&mut self, bus: Bus, linear: f32, sink: &mut dyn AudioSink) {
        self.set_volume_db(bus, linear_to_db(linear.clamp(0.0, 1.0)), sink);
    }

    /// Set a bus by name. Unknown names are logged and ignored.
    pub fn set_volume_by_name(&mut self, name: &str, db: f32, sink: &mut dyn AudioSink) -> bool {
        match Bus::from_name(name) {
            Some(bus) => {
                self.set_volume_db(bus, db, sink);
                true
            }
            None => {
                log::warn!("Unknown audio bus '{name}'");
                false
            }
        }
    }
}

/// Which music track plays in which state
#[derive(Debug, Clone)]
pub struct MusicMap {
    tracks: HashMap<StateKind, &'static str>,
}

impl Default for MusicMap {
    fn default() -> Self {
        Self {
            tracks: HashMap::from([
                (StateKind::MainMenu, "music/main_menu"),
                (StateKind::Game, "music/level"),
                (StateKind::GameOver, "music/game_over"),
            ]),
        }
    }
}

impl MusicMap {
    pub fn track(&self, state: StateKind) -> Option<&'static str> {
        self.tracks.get(&state).copied()
    }

    pub fn set_track(&mut self, state: StateKind, track: &'static str) {
        self.tracks.insert(state, track);
    }

    /// Request the state's track. States without one keep the current music.
    pub fn play_for(&self, state: StateKind, sink: &mut dyn AudioSink) {
        match self.track(state) {
            Some(track) => sink.play_music(track),
            None => log::debug!("No music mapped for {state:?}"),
        }
    }
}
