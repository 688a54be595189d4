//! Stack-based game flow
//!
//! The top of the stack is the active state. Additive states (overlays such
//! as Pause) stack on the current state and leave its scene loaded; exclusive
//! states replace the whole stack. Scene work is not performed here: it is
//! queued as [`SceneCommand`]s for the scene host to apply after the tick,
//! and enter/exit hooks run in the owner from the queued [`FlowEvent`]s.

use std::collections::HashMap;

use super::catalog::StateKind;

/// Identifies a loaded scene instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneHandle(pub u32);

/// Deferred scene operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    Load {
        handle: SceneHandle,
        resource: &'static str,
    },
    Unload {
        handle: SceneHandle,
    },
    /// Re-activate a scene that stayed loaded under an overlay
    Show {
        handle: SceneHandle,
    },
}

/// Applies scene commands (engine, UI toolkit, test double...)
pub trait SceneHost {
    fn load(&mut self, handle: SceneHandle, resource: &'static str);
    fn unload(&mut self, handle: SceneHandle);
    fn show(&mut self, handle: SceneHandle);
}

/// Enter/exit notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEvent {
    /// `loaded` is true when the scene was freshly loaded
    Entered { state: StateKind, loaded: bool },
    Exited { state: StateKind, kept_loaded: bool },
}

/// Flow errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("transition from {from:?} to {to:?} is not allowed")]
    InvalidTransition { from: StateKind, to: StateKind },
    #[error("no previous state to return to")]
    NoPreviousState,
}

/// The state stack
#[derive(Debug, Default)]
pub struct StateMachine {
    stack: Vec<StateKind>,
    scenes: HashMap<StateKind, SceneHandle>,
    next_handle: u32,
    commands: Vec<SceneCommand>,
    events: Vec<FlowEvent>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active state (top of the stack)
    pub fn active(&self) -> Option<StateKind> {
        self.stack.last().copied()
    }

    /// Bottom to top
    pub fn stack(&self) -> &[StateKind] {
        &self.stack
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_loaded(&self, state: StateKind) -> bool {
        self.scenes.contains_key(&state)
    }

    pub fn can_transition_to(&self, target: StateKind) -> bool {
        self.active().is_none_or(|current| current.can_transition_to(target))
    }

    /// Switch to `target` if the active state allows it
    pub fn change_state(&mut self, target: StateKind) -> Result<(), FlowError> {
        match self.active() {
            Some(current) if !current.can_transition_to(target) => {
                log::error!("Transition from {current:?} to {target:?} is not allowed");
                return Err(FlowError::InvalidTransition {
                    from: current,
                    to: target,
                });
            }
            Some(current) => log::info!("State {current:?} -> {target:?}"),
            None => log::warn!("State stack is empty, entering {target:?} unchecked"),
        }

        if target.is_additive() {
            if let Some(top) = self.active() {
                self.exit(top, true);
            }
        } else {
            while let Some(state) = self.stack.pop() {
                self.exit(state, false);
            }
        }

        self.stack.push(target);
        self.enter(target);
        Ok(())
    }

    /// Leave the active state and return to the one below it
    pub fn activate_previous_state(&mut self) -> Result<(), FlowError> {
        if self.stack.len() < 2 {
            return Err(FlowError::NoPreviousState);
        }

        if let Some(top) = self.stack.pop() {
            self.exit(top, false);
        }
        if let Some(previous) = self.active() {
            log::info!("Returning to {previous:?}");
            self.enter(previous);
        }
        Ok(())
    }

    fn enter(&mut self, state: StateKind) {
        let loaded = if let Some(&handle) = self.scenes.get(&state) {
            self.commands.push(SceneCommand::Show { handle });
            false
        } else if let Some(resource) = state.scene() {
            let handle = SceneHandle(self.next_handle);
            self.next_handle += 1;
            self.scenes.insert(state, handle);
            self.commands.push(SceneCommand::Load { handle, resource });
            true
        } else {
            log::error!("No scene mapped for {state:?}");
            false
        };

        self.events.push(FlowEvent::Entered { state, loaded });
    }

    fn exit(&mut self, state: StateKind, keep_loaded: bool) {
        if !keep_loaded {
            if let Some(handle) = self.scenes.remove(&state) {
                self.commands.push(SceneCommand::Unload { handle });
            }
        }

        self.events.push(FlowEvent::Exited {
            state,
            kept_loaded: keep_loaded,
        });
    }

    pub fn pending_commands(&self) -> &[SceneCommand] {
        &self.commands
    }

    /// Apply queued scene commands in order
    pub fn flush(&mut self, host: &mut dyn SceneHost) {
        for command in self.commands.drain(..) {
            match command {
                SceneCommand::Load { handle, resource } => host.load(handle, resource),
                SceneCommand::Unload { handle } => host.unload(handle),
                SceneCommand::Show { handle } => host.show(handle),
            }
        }
    }

    /// Take the enter/exit notifications recorded since the last call
    pub fn take_events(&mut self) -> Vec<FlowEvent> {
        std::mem::take(&mut self.events)
    }
}
