//! `/live/scene/*`: rows of the session view.

use crate::{
    payload::{self, float, int, string},
    AbletonOSC, ArgType, Error, Level, Operation, Param, Shape,
};

const L: Level = Level::Scene;

pub const GET_NAME: Operation = Operation::get("scene_get_name", "/live/scene/get/name", L, Shape::Str, "Scene name.");
pub const SET_NAME: Operation = Operation::set("scene_set_name", "/live/scene/set/name", L, &[Param::new("name", ArgType::Str)], "Rename a scene.");
pub const FIRE: Operation = Operation::action("scene_fire", "/live/scene/fire", L, &[], "Launch every clip in the scene.");
pub const GET_COLOR: Operation = Operation::get("scene_get_color", "/live/scene/get/color", L, Shape::Int, "Scene color as 0xRRGGBB.");
pub const SET_COLOR: Operation = Operation::set(
    "scene_set_color",
    "/live/scene/set/color",
    L,
    &[Param::new("color", ArgType::Int).between(0.0, 16_777_215.0)],
    "Set scene color as 0xRRGGBB.",
);
pub const GET_TEMPO: Operation = Operation::get("scene_get_tempo", "/live/scene/get/tempo", L, Shape::Float, "Tempo the scene switches to when launched.");
pub const SET_TEMPO: Operation = Operation::set(
    "scene_set_tempo",
    "/live/scene/set/tempo",
    L,
    &[Param::new("tempo", ArgType::Float).between(20.0, 999.0)],
    "Set the tempo the scene switches to when launched (20-999).",
);
pub const IS_TRIGGERED: Operation = Operation::get("scene_is_triggered", "/live/scene/get/is_triggered", L, Shape::Bool, "Whether the scene is queued to launch.");

pub const OPERATIONS: &[Operation] = &[GET_NAME, SET_NAME, FIRE, GET_COLOR, SET_COLOR, GET_TEMPO, SET_TEMPO, IS_TRIGGERED];

#[derive(Clone, Copy)]
pub struct Scene<'a> {
    client: &'a AbletonOSC,
}

impl<'a> Scene<'a> {
    pub(crate) fn new(client: &'a AbletonOSC) -> Self {
        Scene { client }
    }

    pub async fn get_name(self, scene_index: u32) -> Result<String, Error> {
        self.client.get(&GET_NAME, &[scene_index]).await
    }

    pub async fn set_name(self, scene_index: u32, name: &str) -> Result<(), Error> {
        self.client.put(&SET_NAME, &[scene_index], vec![string(name)]).await
    }

    pub async fn fire(self, scene_index: u32) -> Result<(), Error> {
        self.client.put(&FIRE, &[scene_index], vec![]).await
    }

    pub async fn get_color(self, scene_index: u32) -> Result<i32, Error> {
        self.client.get(&GET_COLOR, &[scene_index]).await
    }

    pub async fn set_color(self, scene_index: u32, rgb: u32) -> Result<(), Error> {
        let rgb = payload::index("color", rgb)?;
        self.client.put(&SET_COLOR, &[scene_index], vec![int(rgb)]).await
    }

    /// A scene without its own tempo reports -1.
    pub async fn get_tempo(self, scene_index: u32) -> Result<f32, Error> {
        self.client.get(&GET_TEMPO, &[scene_index]).await
    }

    pub async fn set_tempo(self, scene_index: u32, bpm: f32) -> Result<(), Error> {
        self.client.put(&SET_TEMPO, &[scene_index], vec![float(bpm)]).await
    }

    pub async fn is_triggered(self, scene_index: u32) -> Result<bool, Error> {
        self.client.get(&IS_TRIGGERED, &[scene_index]).await
    }
}
