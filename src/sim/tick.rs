//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation deterministically.

use super::level::Surfaces;
use super::state::GameState;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Horizontal paddle input in [-1, 1]
    pub move_axis: f32,
    /// Launch a resting ball
    pub launch: bool,
    /// Pause toggle (handled by the game flow, not the simulation)
    pub pause: bool,
    /// Write the quick save slot
    pub quick_save: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    state.paddle.move_by_axis(input.move_axis, dt);

    if state.ball.is_launched() {
        let surfaces = Surfaces::new(&state.level, &state.paddle);
        if let Some(contact) = state.ball.advance(dt, &surfaces) {
            state.resolve_contact(contact);
        }
    } else {
        state.ball.attach_to(&state.paddle);
        if input.launch {
            state.launch_ball();
        }
    }

    state.update_pickups(dt);
    state.tick_powerups(dt);
}
