//! `/live/view/*`: what is selected in Live's UI.

use crate::{
    payload::{self, int},
    AbletonOSC,
    ArgType::Index,
    Error, Level, Operation, Param, Shape,
};

const L: Level = Level::View;

pub const GET_SELECTED_TRACK: Operation = Operation::get("view_get_selected_track", "/live/view/get/selected_track", L, Shape::Int, "Index of the selected track.");
pub const SET_SELECTED_TRACK: Operation = Operation::set(
    "view_set_selected_track",
    "/live/view/set/selected_track",
    L,
    &[Param::new("track_index", Index)],
    "Select a track.",
);
pub const GET_SELECTED_SCENE: Operation = Operation::get("view_get_selected_scene", "/live/view/get/selected_scene", L, Shape::Int, "Index of the selected scene.");
pub const SET_SELECTED_SCENE: Operation = Operation::set(
    "view_set_selected_scene",
    "/live/view/set/selected_scene",
    L,
    &[Param::new("scene_index", Index)],
    "Select a scene.",
);
pub const GET_SELECTED_CLIP: Operation = Operation::get("view_get_selected_clip", "/live/view/get/selected_clip", L, Shape::IntPair, "The selected clip as [track_index, scene_index].");
pub const SET_SELECTED_CLIP: Operation = Operation::set(
    "view_set_selected_clip",
    "/live/view/set/selected_clip",
    L,
    &[Param::new("track_index", Index), Param::new("scene_index", Index)],
    "Select the clip at a track and scene.",
);
pub const GET_SELECTED_DEVICE: Operation = Operation::get(
    "view_get_selected_device",
    "/live/view/get/selected_device",
    L,
    Shape::IntPair,
    "The selected device as [track_index, device_index].",
);
pub const SET_SELECTED_DEVICE: Operation = Operation::set(
    "view_set_selected_device",
    "/live/view/set/selected_device",
    L,
    &[Param::new("track_index", Index), Param::new("device_index", Index)],
    "Select a device on a track.",
);

pub const OPERATIONS: &[Operation] = &[
    GET_SELECTED_TRACK,
    SET_SELECTED_TRACK,
    GET_SELECTED_SCENE,
    SET_SELECTED_SCENE,
    GET_SELECTED_CLIP,
    SET_SELECTED_CLIP,
    GET_SELECTED_DEVICE,
    SET_SELECTED_DEVICE,
];

#[derive(Clone, Copy)]
pub struct View<'a> {
    client: &'a AbletonOSC,
}

impl<'a> View<'a> {
    pub(crate) fn new(client: &'a AbletonOSC) -> Self {
        View { client }
    }

    pub async fn get_selected_track(self) -> Result<u32, Error> {
        self.client.get(&GET_SELECTED_TRACK, &[]).await
    }

    pub async fn set_selected_track(self, track_index: u32) -> Result<(), Error> {
        let track = payload::index("track_index", track_index)?;
        self.client.put(&SET_SELECTED_TRACK, &[], vec![int(track)]).await
    }

    pub async fn get_selected_scene(self) -> Result<u32, Error> {
        self.client.get(&GET_SELECTED_SCENE, &[]).await
    }

    pub async fn set_selected_scene(self, scene_index: u32) -> Result<(), Error> {
        let scene = payload::index("scene_index", scene_index)?;
        self.client.put(&SET_SELECTED_SCENE, &[], vec![int(scene)]).await
    }

    /// Returns `(track_index, scene_index)`.
    pub async fn get_selected_clip(self) -> Result<(i32, i32), Error> {
        self.get_pair(&GET_SELECTED_CLIP).await
    }

    pub async fn set_selected_clip(self, track_index: u32, scene_index: u32) -> Result<(), Error> {
        let args = vec![
            int(payload::index("track_index", track_index)?),
            int(payload::index("scene_index", scene_index)?),
        ];
        self.client.put(&SET_SELECTED_CLIP, &[], args).await
    }

    /// Returns `(track_index, device_index)`.
    pub async fn get_selected_device(self) -> Result<(i32, i32), Error> {
        self.get_pair(&GET_SELECTED_DEVICE).await
    }

    pub async fn set_selected_device(self, track_index: u32, device_index: u32) -> Result<(), Error> {
        let args = vec![
            int(payload::index("track_index", track_index)?),
            int(payload::index("device_index", device_index)?),
        ];
        self.client.put(&SET_SELECTED_DEVICE, &[], args).await
    }

    async fn get_pair(self, op: &Operation) -> Result<(i32, i32), Error> {
        let reply = self.client.execute(op, &[], Vec::new()).await?;
        Ok((
            payload::value_at(op.address, &reply, 0)?,
            payload::value_at(op.address, &reply, 1)?,
        ))
    }
}
