//! The game context
//!
//! Owns the simulation, the flow state machine and the outside collaborators
//! (scene host, audio sink, save store). The host application constructs one
//! [`Game`] and calls [`Game::update`] once per frame.

use crate::audio::{AudioSink, Mixer, MusicMap};
use crate::consts::*;
use crate::flow::{FlowError, FlowEvent, SceneHost, StateKind, StateMachine};
use crate::persistence::{Persist, PersistError, SaveStore, read_document, write_document};
use crate::settings::Settings;
use crate::sim::{self, GameEvent, GameState, TickInput};

/// Errors surfaced by game-level operations
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("no cleared level to continue from")]
    LevelNotCleared,
}

/// How the next Game scene load sets up the simulation
#[derive(Debug, Default)]
enum LevelStart {
    #[default]
    NewRun,
    NextLevel,
    Restore(Box<GameState>),
}

/// Game context
pub struct Game<S, A, T> {
    state: GameState,
    flow: StateMachine,
    scenes: S,
    audio: A,
    store: T,
    music: MusicMap,
    mixer: Mixer,
    accumulator: f32,
    /// Input held between frames; one-shot flags wait for the next tick
    input: TickInput,
    paused: bool,
    next_start: LevelStart,
}

impl<S: SceneHost, A: AudioSink, T: SaveStore> Game<S, A, T> {
    pub fn new(seed: u64, scenes: S, audio: A, store: T) -> Self {
        Self {
            state: GameState::new(seed),
            flow: StateMachine::new(),
            scenes,
            audio,
            store,
            music: MusicMap::default(),
            mixer: Mixer::new(),
            accumulator: 0.0,
            input: TickInput::default(),
            paused: false,
            next_start: LevelStart::NewRun,
        }
    }

    /// Enter the main menu
    pub fn start(&mut self) -> Result<(), GameError> {
        log::info!("Arkanoid starting (seed {})", self.state.seed);
        self.change_state(StateKind::MainMenu)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn flow(&self) -> &StateMachine {
        &self.flow
    }

    pub fn active_state(&self) -> Option<StateKind> {
        self.flow.active()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn scenes(&self) -> &S {
        &self.scenes
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn music_mut(&mut self) -> &mut MusicMap {
        &mut self.music
    }

    /// Switch states. Going back to the state directly under an overlay
    /// resumes it instead of reloading it.
    pub fn change_state(&mut self, target: StateKind) -> Result<(), GameError> {
        let stack = self.flow.stack();
        let resumes = stack.len() >= 2
            && stack[stack.len() - 2] == target
            && stack
                .last()
                .is_some_and(|top| top.is_additive() && top.can_transition_to(target));

        if resumes {
            self.flow.activate_previous_state()?;
        } else {
            self.flow.change_state(target)?;
        }
        self.process_flow();
        Ok(())
    }

    pub fn activate_previous_state(&mut self) -> Result<(), GameError> {
        self.flow.activate_previous_state()?;
        self.process_flow();
        Ok(())
    }

    /// Start a fresh run
    pub fn new_game(&mut self) -> Result<(), GameError> {
        self.start_with(LevelStart::NewRun)
    }

    /// Continue with the next level after a win
    pub fn next_level(&mut self) -> Result<(), GameError> {
        if self.active_state() != Some(StateKind::Win) {
            return Err(GameError::LevelNotCleared);
        }
        self.start_with(LevelStart::NextLevel)
    }

    fn start_with(&mut self, start: LevelStart) -> Result<(), GameError> {
        self.next_start = start;
        let result = self.change_state(StateKind::Game);
        if result.is_err() {
            self.next_start = LevelStart::NewRun;
        }
        result
    }

    /// Run simulation ticks for one frame. Returns the number of ticks run.
    /// One-shot inputs from a frame too short for a tick carry over to the next.
    pub fn update(&mut self, frame_dt: f32, input: &TickInput) -> u32 {
        self.input.move_axis = input.move_axis;
        self.input.launch |= input.launch;
        self.input.pause |= input.pause;
        self.input.quick_save |= input.quick_save;

        let dt = frame_dt.min(MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.input.clone();
            self.tick(&input);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.launch = false;
            self.input.pause = false;
            self.input.quick_save = false;
        }
        substeps
    }

    fn tick(&mut self, input: &TickInput) {
        if input.pause {
            self.toggle_pause();
        }

        if input.quick_save && self.active_state() == Some(StateKind::Game) {
            if let Err(e) = self.quick_save() {
                log::error!("Quick save failed: {e}");
            }
        }

        if self.active_state() != Some(StateKind::Game) || self.paused {
            return;
        }

        sim::tick(&mut self.state, input, SIM_DT);
        self.dispatch_events();
    }

    fn toggle_pause(&mut self) {
        let result = match self.active_state() {
            Some(StateKind::Game) => self.change_state(StateKind::Pause),
            Some(StateKind::Pause) => self.activate_previous_state(),
            _ => Ok(()),
        };
        if let Err(e) = result {
            log::error!("Pause toggle failed: {e}");
        }
    }

    fn dispatch_events(&mut self) {
        let mut outcome = None;
        for event in self.state.drain_events() {
            match event {
                GameEvent::Effect { kind, position } => self.audio.play_effect(kind, position),
                GameEvent::OutOfLives => outcome = Some(StateKind::GameOver),
                GameEvent::LevelCleared => outcome = Some(StateKind::Win),
                other => log::debug!("{other:?}"),
            }
        }

        if let Some(target) = outcome {
            if let Err(e) = self.change_state(target) {
                log::error!("Could not enter {target:?}: {e}");
            }
        }
    }

    /// Apply queued scene commands and run enter/exit hooks
    fn process_flow(&mut self) {
        self.flow.flush(&mut self.scenes);

        for event in self.flow.take_events() {
            match event {
                FlowEvent::Entered { state, loaded } => self.on_enter(state, loaded),
                FlowEvent::Exited { state, .. } => self.on_exit(state),
            }
        }
    }

    fn on_enter(&mut self, state: StateKind, loaded: bool) {
        self.music.play_for(state, &mut self.audio);
        match state {
            StateKind::Pause => self.paused = true,
            StateKind::Win => self.audio.stop_music(),
            StateKind::Game if loaded => self.begin_level(),
            _ => {}
        }
    }

    fn on_exit(&mut self, state: StateKind) {
        if state == StateKind::Pause {
            self.paused = false;
        }
    }

    fn begin_level(&mut self) {
        match std::mem::take(&mut self.next_start) {
            LevelStart::NewRun => self.state.reset_run(),
            LevelStart::NextLevel => self.state.advance_level(),
            LevelStart::Restore(state) => self.state = *state,
        }
        self.accumulator = 0.0;
        self.input = TickInput::default();
    }

    /// Write the current game to the quick save slot
    pub fn quick_save(&mut self) -> Result<(), GameError> {
        write_document(&mut self.store, QUICK_SAVE_SLOT, &self.state.save())?;
        log::info!("Quick saved (level {})", self.state.level.index);
        Ok(())
    }

    /// Restore the quick save slot and enter the game without resetting it.
    /// A bad or missing save leaves everything as it was.
    pub fn load_quick_save(&mut self) -> Result<(), GameError> {
        let doc = read_document(&self.store, QUICK_SAVE_SLOT)?;
        let mut restored = self.state.clone();
        restored.load(&doc)?;

        if self.flow.is_loaded(StateKind::Game) {
            self.state = restored;
            if self.active_state() != Some(StateKind::Game) {
                self.change_state(StateKind::Game)?;
            }
            Ok(())
        } else {
            self.start_with(LevelStart::Restore(Box::new(restored)))
        }
    }

    /// Push settings to the mixer
    pub fn apply_settings(&mut self, settings: &Settings) {
        settings.apply(&mut self.mixer, &mut self.audio);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullAudio;
    use crate::flow::SceneHandle;
    use crate::persistence::MemoryStore;

    #[derive(Debug, Default)]
    struct CountingScenes {
        loads: Vec<&'static str>,
    }

    impl SceneHost for CountingScenes {
        fn load(&mut self, _handle: SceneHandle, resource: &'static str) {
            self.loads.push(resource);
        }
        fn unload(&mut self, _handle: SceneHandle) {}
        fn show(&mut self, _handle: SceneHandle) {}
    }

    fn game() -> Game<CountingScenes, NullAudio, MemoryStore> {
        let mut game = Game::new(3, CountingScenes::default(), NullAudio, MemoryStore::new());
        game.start().unwrap();
        game
    }

    #[test]
    fn test_start_enters_main_menu() {
        let game = game();
        assert_eq!(game.active_state(), Some(StateKind::MainMenu));
        assert_eq!(game.scenes().loads, vec!["ui/main_menu"]);
    }

    #[test]
    fn test_returning_from_overlay_resumes() {
        let mut game = game();
        game.new_game().unwrap();
        game.change_state(StateKind::Pause).unwrap();
        game.change_state(StateKind::Game).unwrap();

        assert_eq!(game.flow().stack(), &[StateKind::Game]);
        assert_eq!(game.scenes().loads.iter().filter(|r| **r == "level").count(), 1);
    }

    #[test]
    fn test_next_level_requires_win() {
        let mut game = game();
        assert!(matches!(game.next_level(), Err(GameError::LevelNotCleared)));
        assert_eq!(game.active_state(), Some(StateKind::MainMenu));
    }

    #[test]
    fn test_no_ticks_outside_game() {
        let mut game = game();
        let ticks_before = game.state().time_ticks;
        game.update(0.05, &TickInput::default());
        assert_eq!(game.state().time_ticks, ticks_before);
    }

    #[test]
    fn test_update_caps_substeps() {
        let mut game = game();
        game.new_game().unwrap();
        let ran = game.update(10.0, &TickInput::default());
        assert!(ran <= MAX_SUBSTEPS);
        assert!(ran > 0);
    }

    #[test]
    fn test_pause_flag_follows_overlay() {
        let mut game = game();
        game.new_game().unwrap();
        assert!(!game.is_paused());

        game.change_state(StateKind::Pause).unwrap();
        assert!(game.is_paused());
        game.change_state(StateKind::Game).unwrap();
        assert!(!game.is_paused());

        game.change_state(StateKind::Pause).unwrap();
        game.change_state(StateKind::MainMenu).unwrap();
        assert!(!game.is_paused());
    }

    #[test]
    fn test_launch_survives_frame_without_tick() {
        let mut game = game();
        game.new_game().unwrap();

        let launch = TickInput {
            launch: true,
            ..Default::default()
        };
        assert_eq!(game.update(SIM_DT * 0.6, &launch), 0);
        assert!(!game.state().ball.is_launched());

        assert_eq!(game.update(SIM_DT * 0.6, &TickInput::default()), 1);
        assert!(game.state().ball.is_launched());

        // Consumed by that tick
        game.state.reset_run();
        game.update(SIM_DT * 2.0, &TickInput::default());
        assert!(!game.state().ball.is_launched());
    }
}
