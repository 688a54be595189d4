//! Power-up effects
//!
//! Timed, stackable effects with an activate / update / deactivate
//! lifecycle. The registry owns every active effect; the side effects
//! themselves (wider paddle, ghost ball, extra life) are applied through a
//! [`PowerUpHost`] so the registry does not depend on the rest of the game.

use serde::{Deserialize, Serialize};

use crate::consts::{EXTEND_PADDLE_DURATION, EXTEND_PADDLE_MULTIPLIER, GHOST_BALL_DURATION};

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Doubles the paddle width for a while
    ExtendPaddle,
    /// Ball passes through blocks, destroying them without bouncing
    GhostBall,
    /// One more life, applied instantly
    ExtraLife,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::ExtendPaddle,
        PowerUpKind::GhostBall,
        PowerUpKind::ExtraLife,
    ];

    /// Whether collecting this kind again while active extends it
    pub fn stacks(&self) -> bool {
        matches!(self, PowerUpKind::ExtendPaddle | PowerUpKind::GhostBall)
    }
}

/// Receiver of power-up side effects
pub trait PowerUpHost {
    fn expand_paddle(&mut self, multiplier: f32);
    fn shrink_paddle(&mut self, multiplier: f32);
    fn set_ghost_ball(&mut self, ghost: bool);
    fn add_life(&mut self);
}

/// One effect instance
#[derive(Debug, Clone, PartialEq)]
pub struct PowerUpEffect {
    kind: PowerUpKind,
    /// Seconds; zero or less means instant
    duration: f32,
    time_remaining: f32,
    active: bool,
}

impl PowerUpEffect {
    /// Fresh, inactive effect for `kind`
    pub fn for_kind(kind: PowerUpKind) -> Self {
        let duration = match kind {
            PowerUpKind::ExtendPaddle => EXTEND_PADDLE_DURATION,
            PowerUpKind::GhostBall => GHOST_BALL_DURATION,
            PowerUpKind::ExtraLife => 0.0,
        };
        Self {
            kind,
            duration,
            time_remaining: 0.0,
            active: false,
        }
    }

    pub fn kind(&self) -> PowerUpKind {
        self.kind
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_instant(&self) -> bool {
        self.duration <= 0.0
    }

    fn activate(&mut self, host: &mut impl PowerUpHost) {
        self.active = true;
        self.time_remaining = self.duration;

        match self.kind {
            PowerUpKind::ExtendPaddle => host.expand_paddle(EXTEND_PADDLE_MULTIPLIER),
            PowerUpKind::GhostBall => host.set_ghost_ball(true),
            PowerUpKind::ExtraLife => host.add_life(),
        }

        if self.is_instant() {
            self.deactivate(host);
        }
    }

    fn deactivate(&mut self, host: &mut impl PowerUpHost) {
        if !self.active {
            return;
        }
        self.active = false;

        match self.kind {
            PowerUpKind::ExtendPaddle => host.shrink_paddle(EXTEND_PADDLE_MULTIPLIER),
            PowerUpKind::GhostBall => host.set_ghost_ball(false),
            PowerUpKind::ExtraLife => {}
        }
    }

    /// Returns false once the effect has expired
    fn update(&mut self, dt: f32, host: &mut impl PowerUpHost) -> bool {
        if self.duration > 0.0 {
            self.time_remaining -= dt;
            if self.time_remaining <= 0.0 {
                self.deactivate(host);
                return false;
            }
        }
        self.active
    }
}

/// Notifications recorded by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpEvent {
    Activated(PowerUpKind),
    Deactivated(PowerUpKind),
}

/// Owner of all active effects, at most one per kind
#[derive(Debug, Clone, Default)]
pub struct PowerUpRegistry {
    active: Vec<PowerUpEffect>,
    events: Vec<PowerUpEvent>,
}

impl PowerUpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect a power-up of `kind`
    pub fn activate(&mut self, kind: PowerUpKind, host: &mut impl PowerUpHost) {
        if let Some(existing) = self.active.iter_mut().find(|e| e.kind == kind) {
            if kind.stacks() {
                existing.time_remaining += existing.duration;
                log::debug!(
                    "{kind:?} stacked, {:.1}s remaining",
                    existing.time_remaining
                );
            }
            return;
        }

        let mut effect = PowerUpEffect::for_kind(kind);
        effect.activate(host);
        self.events.push(PowerUpEvent::Activated(kind));

        if effect.is_active() {
            self.active.push(effect);
        } else {
            self.events.push(PowerUpEvent::Deactivated(kind));
        }
    }

    /// Advance timers; expired effects are deactivated and removed
    pub fn tick(&mut self, dt: f32, host: &mut impl PowerUpHost) {
        let events = &mut self.events;
        self.active.retain_mut(|effect| {
            let keep = effect.update(dt, host);
            if !keep {
                events.push(PowerUpEvent::Deactivated(effect.kind));
            }
            keep
        });
    }

    /// Cancel an active effect early. Returns false if it was not active.
    pub fn deactivate(&mut self, kind: PowerUpKind, host: &mut impl PowerUpHost) -> bool {
        let Some(index) = self.active.iter().position(|e| e.kind == kind) else {
            return false;
        };

        let mut effect = self.active.remove(index);
        effect.deactivate(host);
        self.events.push(PowerUpEvent::Deactivated(kind));
        true
    }

    /// Cancel every active effect
    pub fn clear(&mut self, host: &mut impl PowerUpHost) {
        for mut effect in self.active.drain(..) {
            effect.deactivate(host);
            self.events.push(PowerUpEvent::Deactivated(effect.kind));
        }
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active.iter().any(|e| e.kind == kind)
    }

    pub fn time_remaining(&self, kind: PowerUpKind) -> Option<f32> {
        self.active
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.time_remaining)
    }

    pub fn active(&self) -> &[PowerUpEffect] {
        &self.active
    }

    /// Take the notifications recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<PowerUpEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct TestHost {
        width: f32,
        ghost: bool,
        lives: u32,
        expand_calls: u32,
        shrink_calls: u32,
    }

    impl TestHost {
        fn new() -> Self {
            Self {
                width: 1.0,
                ..Default::default()
            }
        }
    }

    impl PowerUpHost for TestHost {
        fn expand_paddle(&mut self, multiplier: f32) {
            self.width *= multiplier;
            self.expand_calls += 1;
        }

        fn shrink_paddle(&mut self, multiplier: f32) {
            self.width /= multiplier;
            self.shrink_calls += 1;
        }

        fn set_ghost_ball(&mut self, ghost: bool) {
            self.ghost = ghost;
        }

        fn add_life(&mut self) {
            self.lives += 1;
        }
    }

    #[test]
    fn test_activate_applies_side_effect() {
        let mut host = TestHost::new();
        let mut registry = PowerUpRegistry::new();

        registry.activate(PowerUpKind::ExtendPaddle, &mut host);
        assert!(registry.is_active(PowerUpKind::ExtendPaddle));
        assert_eq!(host.width, EXTEND_PADDLE_MULTIPLIER);
        assert_eq!(
            registry.drain_events(),
            vec![PowerUpEvent::Activated(PowerUpKind::ExtendPaddle)]
        );
    }

    #[test]
    fn test_stacking_extends_time_without_reapplying() {
        let mut host = TestHost::new();
        let mut registry = PowerUpRegistry::new();

        registry.activate(PowerUpKind::ExtendPaddle, &mut host);
        registry.tick(3.0, &mut host);
        let before = registry.time_remaining(PowerUpKind::ExtendPaddle).unwrap();

        registry.activate(PowerUpKind::ExtendPaddle, &mut host);
        let after = registry.time_remaining(PowerUpKind::ExtendPaddle).unwrap();

        assert!((after - before - EXTEND_PADDLE_DURATION).abs() < 1e-5);
        assert_eq!(host.expand_calls, 1, "multiplier applied only once");
        assert_eq!(host.width, EXTEND_PADDLE_MULTIPLIER);
        assert_eq!(registry.active().len(), 1);
    }

    #[test]
    fn test_expiry_restores_baseline() {
        let mut host = TestHost::new();
        let mut registry = PowerUpRegistry::new();

        registry.activate(PowerUpKind::ExtendPaddle, &mut host);
        registry.activate(PowerUpKind::GhostBall, &mut host);
        assert!(host.ghost);

        registry.tick(GHOST_BALL_DURATION + 0.01, &mut host);
        assert!(!host.ghost);
        assert!(!registry.is_active(PowerUpKind::GhostBall));
        assert!(registry.is_active(PowerUpKind::ExtendPaddle));

        registry.tick(EXTEND_PADDLE_DURATION, &mut host);
        assert!(registry.active().is_empty());
        assert_eq!(host.width, 1.0);
        assert_eq!(host.shrink_calls, 1);
    }

    #[test]
    fn test_extra_life_is_instant() {
        let mut host = TestHost::new();
        let mut registry = PowerUpRegistry::new();

        registry.activate(PowerUpKind::ExtraLife, &mut host);
        registry.activate(PowerUpKind::ExtraLife, &mut host);

        assert_eq!(host.lives, 2);
        assert!(!registry.is_active(PowerUpKind::ExtraLife));
        assert!(registry.active().is_empty());
        assert_eq!(
            registry.drain_events(),
            vec![
                PowerUpEvent::Activated(PowerUpKind::ExtraLife),
                PowerUpEvent::Deactivated(PowerUpKind::ExtraLife),
                PowerUpEvent::Activated(PowerUpKind::ExtraLife),
                PowerUpEvent::Deactivated(PowerUpKind::ExtraLife),
            ]
        );
    }

    #[test]
    fn test_explicit_deactivate() {
        let mut host = TestHost::new();
        let mut registry = PowerUpRegistry::new();

        assert!(!registry.deactivate(PowerUpKind::GhostBall, &mut host));

        registry.activate(PowerUpKind::GhostBall, &mut host);
        assert!(registry.deactivate(PowerUpKind::GhostBall, &mut host));
        assert!(!host.ghost);
        assert!(!registry.deactivate(PowerUpKind::GhostBall, &mut host));
    }

    #[test]
    fn test_clear_returns_paddle_to_baseline_once() {
        let mut host = TestHost::new();
        let mut registry = PowerUpRegistry::new();

        registry.activate(PowerUpKind::ExtendPaddle, &mut host);
        registry.activate(PowerUpKind::ExtendPaddle, &mut host);
        registry.clear(&mut host);
        registry.clear(&mut host);

        assert_eq!(host.width, 1.0);
        assert_eq!(host.shrink_calls, 1);
    }

    #[test]
    fn test_factory_durations() {
        assert_eq!(
            PowerUpEffect::for_kind(PowerUpKind::ExtendPaddle).duration(),
            EXTEND_PADDLE_DURATION
        );
        assert!(PowerUpEffect::for_kind(PowerUpKind::ExtraLife).is_instant());
        assert!(!PowerUpEffect::for_kind(PowerUpKind::GhostBall).is_active());
    }
}
