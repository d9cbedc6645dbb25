//! `/live/clip_slot/*`: the cell at (track, scene) in session view.

use crate::{payload::float, AbletonOSC, ArgType, Error, Level, Operation, Param, Shape};

const L: Level = Level::ClipSlot;

/// Length of a new clip when none is given, one bar of 4/4.
pub const DEFAULT_CLIP_LENGTH: f32 = 4.0;

pub const HAS_CLIP: Operation = Operation::get("clip_slot_has_clip", "/live/clip_slot/get/has_clip", L, Shape::Bool, "Whether the slot holds a clip.");
pub const CREATE_CLIP: Operation = Operation::action(
    "clip_slot_create_clip",
    "/live/clip_slot/create_clip",
    L,
    &[Param::new("length", ArgType::Float).positive()],
    "Create an empty MIDI clip in the slot, length in beats.",
);
pub const DELETE_CLIP: Operation = Operation::action("clip_slot_delete_clip", "/live/clip_slot/delete_clip", L, &[], "Delete the clip in the slot.");
pub const FIRE: Operation = Operation::action("clip_slot_fire", "/live/clip_slot/fire", L, &[], "Launch the slot.");
pub const STOP: Operation = Operation::action("clip_slot_stop", "/live/clip_slot/stop", L, &[], "Stop the slot.");
pub const IS_PLAYING: Operation = Operation::get("clip_slot_is_playing", "/live/clip_slot/get/is_playing", L, Shape::Bool, "Whether the slot's clip is playing.");
pub const IS_TRIGGERED: Operation = Operation::get("clip_slot_is_triggered", "/live/clip_slot/get/is_triggered", L, Shape::Bool, "Whether the slot is queued to launch.");
pub const IS_RECORDING: Operation = Operation::get("clip_slot_is_recording", "/live/clip_slot/get/is_recording", L, Shape::Bool, "Whether the slot is recording.");

pub const OPERATIONS: &[Operation] = &[HAS_CLIP, CREATE_CLIP, DELETE_CLIP, FIRE, STOP, IS_PLAYING, IS_TRIGGERED, IS_RECORDING];

#[derive(Clone, Copy)]
pub struct ClipSlot<'a> {
    client: &'a AbletonOSC,
}

impl<'a> ClipSlot<'a> {
    pub(crate) fn new(client: &'a AbletonOSC) -> Self {
        ClipSlot { client }
    }

    pub async fn has_clip(self, track_index: u32, scene_index: u32) -> Result<bool, Error> {
        self.client.get(&HAS_CLIP, &[track_index, scene_index]).await
    }

    /// Creates an empty MIDI clip. `length` is in beats and defaults to
    /// [`DEFAULT_CLIP_LENGTH`].
    pub async fn create_clip(self, track_index: u32, scene_index: u32, length: Option<f32>) -> Result<(), Error> {
        let length = length.unwrap_or(DEFAULT_CLIP_LENGTH);
        self.client
            .put(&CREATE_CLIP, &[track_index, scene_index], vec![float(length)])
            .await
    }

    pub async fn delete_clip(self, track_index: u32, scene_index: u32) -> Result<(), Error> {
        self.client.put(&DELETE_CLIP, &[track_index, scene_index], vec![]).await
    }

    pub async fn fire(self, track_index: u32, scene_index: u32) -> Result<(), Error> {
        self.client.put(&FIRE, &[track_index, scene_index], vec![]).await
    }

    pub async fn stop(self, track_index: u32, scene_index: u32) -> Result<(), Error> {
        self.client.put(&STOP, &[track_index, scene_index], vec![]).await
    }

    pub async fn is_playing(self, track_index: u32, scene_index: u32) -> Result<bool, Error> {
        self.client.get(&IS_PLAYING, &[track_index, scene_index]).await
    }

    pub async fn is_triggered(self, track_index: u32, scene_index: u32) -> Result<bool, Error> {
        self.client.get(&IS_TRIGGERED, &[track_index, scene_index]).await
    }

    pub async fn is_recording(self, track_index: u32, scene_index: u32) -> Result<bool, Error> {
        self.client.get(&IS_RECORDING, &[track_index, scene_index]).await
    }
}
