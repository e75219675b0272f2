//! Application-level orchestration.
//!
//! This module owns the playback lifecycle (ticker, state transitions) and the dataset
//! load. UI/CLI layers send commands in and receive `AppEvent`s back.

mod controller;

pub(crate) use controller::{run_controller, ControllerSettings, UiCommand};
