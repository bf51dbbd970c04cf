//! Operator confirmation gate: phase transitions plus button debouncing.

pub mod debounce;
pub mod machine;

pub use debounce::{Button, SignalDebouncer};
pub use machine::{GateEvent, Phase, PhaseGate, TransitionResult};
