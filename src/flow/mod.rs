//! Game flow: which screen is active and how screens change

pub mod catalog;
pub mod machine;

pub use catalog::{StateDef, StateKind};
pub use machine::{FlowError, FlowEvent, SceneCommand, SceneHandle, SceneHost, StateMachine};
