//! The AbletonOSC address space, one module per Live object.
//!
//! Each module declares its operations as [`Operation`] constants and a
//! typed wrapper that runs them. [`catalog`] lists every operation that is
//! exposed as a tool.

pub mod api;
pub mod application;
pub mod clip;
pub mod clip_slot;
pub mod device;
pub mod scene;
pub mod song;
pub mod track;
pub mod view;

use crate::Operation;

/// Every operation, grouped by object.
pub fn catalog() -> impl Iterator<Item = &'static Operation> {
    [
        application::OPERATIONS,
        api::OPERATIONS,
        song::OPERATIONS,
        track::OPERATIONS,
        clip_slot::OPERATIONS,
        clip::OPERATIONS,
        device::OPERATIONS,
        scene::OPERATIONS,
        view::OPERATIONS,
    ]
    .into_iter()
    .flatten()
}

/// Looks an operation up by its tool name, e.g. `song_get_tempo`.
pub fn find(name: &str) -> Option<&'static Operation> {
    catalog().find(|op| op.name == name)
}
