//! Game states and their transition rules

/// Game states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    MainMenu,
    /// Reserved; nothing transitions here yet
    LevelSelect,
    Settings,
    Game,
    Pause,
    GameOver,
    Win,
}

impl StateKind {
    pub const ALL: [StateKind; 7] = [
        StateKind::MainMenu,
        StateKind::LevelSelect,
        StateKind::Settings,
        StateKind::Game,
        StateKind::Pause,
        StateKind::GameOver,
        StateKind::Win,
    ];

    /// Static definition of this state
    pub fn def(self) -> &'static StateDef {
        &CATALOG[self as usize]
    }

    /// Additive states stack on top of the current one instead of replacing it
    pub fn is_additive(self) -> bool {
        self.def().additive
    }

    /// States this one may transition to
    pub fn targets(self) -> &'static [StateKind] {
        self.def().targets
    }

    pub fn can_transition_to(self, target: StateKind) -> bool {
        self.targets().contains(&target)
    }

    /// Scene resource loaded when entering this state
    pub fn scene(self) -> Option<&'static str> {
        self.def().scene
    }
}

/// How a state behaves in the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDef {
    pub kind: StateKind,
    pub additive: bool,
    pub targets: &'static [StateKind],
    pub scene: Option<&'static str>,
}

/// Indexed by `StateKind` discriminant
static CATALOG: [StateDef; 7] = [
    StateDef {
        kind: StateKind::MainMenu,
        additive: false,
        targets: &[StateKind::Settings, StateKind::Game],
        scene: Some("ui/main_menu"),
    },
    StateDef {
        kind: StateKind::LevelSelect,
        additive: false,
        targets: &[StateKind::MainMenu],
        scene: None,
    },
    StateDef {
        kind: StateKind::Settings,
        additive: true,
        targets: &[StateKind::MainMenu],
        scene: Some("ui/options"),
    },
    StateDef {
        kind: StateKind::Game,
        additive: false,
        targets: &[StateKind::Pause, StateKind::GameOver, StateKind::Win],
        scene: Some("level"),
    },
    StateDef {
        kind: StateKind::Pause,
        additive: true,
        targets: &[StateKind::Game, StateKind::MainMenu],
        scene: Some("ui/options"),
    },
    StateDef {
        kind: StateKind::GameOver,
        additive: false,
        targets: &[StateKind::MainMenu, StateKind::Game],
        scene: Some("ui/game_over"),
    },
    StateDef {
        kind: StateKind::Win,
        additive: false,
        targets: &[StateKind::MainMenu, StateKind::Game],
        scene: Some("ui/win"),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_matches_kinds() {
        for state in StateKind::ALL {
            assert_eq!(state.def().kind, state);
        }
    }

    #[test]
    fn test_whitelists() {
        assert!(StateKind::MainMenu.can_transition_to(StateKind::Game));
        assert!(StateKind::Game.can_transition_to(StateKind::Pause));
        assert!(StateKind::Pause.can_transition_to(StateKind::MainMenu));
        assert!(!StateKind::MainMenu.can_transition_to(StateKind::Pause));
        assert!(!StateKind::Game.can_transition_to(StateKind::MainMenu));
        assert!(!StateKind::Settings.can_transition_to(StateKind::Game));
    }

    #[test]
    fn test_no_state_targets_level_select() {
        for state in StateKind::ALL {
            assert!(!state.can_transition_to(StateKind::LevelSelect));
        }
        assert_eq!(StateKind::LevelSelect.scene(), None);
    }

    #[test]
    fn test_only_overlays_are_additive() {
        let additive: Vec<_> = StateKind::ALL.into_iter().filter(|s| s.is_additive()).collect();
        assert_eq!(additive, vec![StateKind::Settings, StateKind::Pause]);
    }
}
