//! `/live/track/*`: mixer state, sends and devices of one track.

use crate::{
    payload::{self, boolean, float, int, string},
    AbletonOSC,
    ArgType::{self, *},
    Error, Level, Operation, Param, Shape, Updates,
};

const L: Level = Level::Track;

const ENABLED: &[Param] = &[Param::new("enabled", ArgType::Bool)];

pub const GET_NAME: Operation = Operation::get("track_get_name", "/live/track/get/name", L, Shape::Str, "Track name.");
pub const SET_NAME: Operation = Operation::set("track_set_name", "/live/track/set/name", L, &[Param::new("name", Str)], "Rename a track.");
pub const GET_VOLUME: Operation = Operation::get("track_get_volume", "/live/track/get/volume", L, Shape::Float, "Track volume (0-1, 0.85 is 0 dB).");
pub const SET_VOLUME: Operation = Operation::set(
    "track_set_volume",
    "/live/track/set/volume",
    L,
    &[Param::new("volume", Float).between(0.0, 1.0)],
    "Set track volume (0-1, 0.85 is 0 dB).",
);
pub const GET_PANNING: Operation = Operation::get("track_get_panning", "/live/track/get/panning", L, Shape::Float, "Track panning (-1 left, 1 right).");
pub const SET_PANNING: Operation = Operation::set(
    "track_set_panning",
    "/live/track/set/panning",
    L,
    &[Param::new("panning", Float).between(-1.0, 1.0)],
    "Set track panning (-1 left, 1 right).",
);
pub const GET_MUTE: Operation = Operation::get("track_get_mute", "/live/track/get/mute", L, Shape::Bool, "Whether the track is muted.");
pub const SET_MUTE: Operation = Operation::set("track_set_mute", "/live/track/set/mute", L, ENABLED, "Mute or unmute a track.");
pub const GET_SOLO: Operation = Operation::get("track_get_solo", "/live/track/get/solo", L, Shape::Bool, "Whether the track is soloed.");
pub const SET_SOLO: Operation = Operation::set("track_set_solo", "/live/track/set/solo", L, ENABLED, "Solo or unsolo a track.");
pub const GET_ARM: Operation = Operation::get("track_get_arm", "/live/track/get/arm", L, Shape::Bool, "Whether the track is armed for recording.");
pub const SET_ARM: Operation = Operation::set("track_set_arm", "/live/track/set/arm", L, ENABLED, "Arm or disarm a track.");
pub const GET_COLOR: Operation = Operation::get("track_get_color", "/live/track/get/color", L, Shape::Int, "Track color as 0xRRGGBB.");
pub const SET_COLOR: Operation = Operation::set(
    "track_set_color",
    "/live/track/set/color",
    L,
    &[Param::new("color", Int).between(0.0, 16_777_215.0)],
    "Set track color as 0xRRGGBB.",
);
pub const GET_NUM_DEVICES: Operation = Operation::get("track_get_num_devices", "/live/track/get/num_devices", L, Shape::Int, "Number of devices on the track.");
pub const GET_DEVICE_NAMES: Operation = Operation::get("track_get_device_names", "/live/track/get/devices/name", L, Shape::StrList, "Names of the devices on the track, in chain order.");
pub const STOP_ALL_CLIPS: Operation = Operation::action("track_stop_all_clips", "/live/track/stop_all_clips", L, &[], "Stop every clip on the track.");
pub const INSERT_DEVICE: Operation = Operation::call(
    "track_insert_device",
    "/live/track/insert_device",
    L,
    &[Param::new("device_name", Str).non_empty()],
    Shape::MaybeIndex,
    "Load a device from the browser by name onto the end of the track's chain. Returns its device index, or null when no device matches.",
);

pub const GET_SEND: Operation = Operation::get("track_get_send", "/live/track/get/send", Level::Send, Shape::Float, "Send level (0-1).");
pub const SET_SEND: Operation = Operation::set(
    "track_set_send",
    "/live/track/set/send",
    Level::Send,
    &[Param::new("value", Float).between(0.0, 1.0)],
    "Set a send level (0-1).",
);

const START_LISTEN_VOLUME: Operation = Operation::action("track_start_listen_volume", "/live/track/start_listen/volume", L, &[], "");
const STOP_LISTEN_VOLUME: Operation = Operation::action("track_stop_listen_volume", "/live/track/stop_listen/volume", L, &[], "");

pub const OPERATIONS: &[Operation] = &[
    GET_NAME,
    SET_NAME,
    GET_VOLUME,
    SET_VOLUME,
    GET_PANNING,
    SET_PANNING,
    GET_MUTE,
    SET_MUTE,
    GET_SOLO,
    SET_SOLO,
    GET_ARM,
    SET_ARM,
    GET_COLOR,
    SET_COLOR,
    GET_NUM_DEVICES,
    GET_DEVICE_NAMES,
    STOP_ALL_CLIPS,
    INSERT_DEVICE,
    GET_SEND,
    SET_SEND,
];

/// Track operations. Every method takes the track's position in the song.
#[derive(Clone, Copy)]
pub struct Track<'a> {
    client: &'a AbletonOSC,
}

impl<'a> Track<'a> {
    pub(crate) fn new(client: &'a AbletonOSC) -> Self {
        Track { client }
    }

    pub async fn get_name(self, track_index: u32) -> Result<String, Error> {
        self.client.get(&GET_NAME, &[track_index]).await
    }

    pub async fn set_name(self, track_index: u32, name: &str) -> Result<(), Error> {
        self.client.put(&SET_NAME, &[track_index], vec![string(name)]).await
    }

    pub async fn get_volume(self, track_index: u32) -> Result<f32, Error> {
        self.client.get(&GET_VOLUME, &[track_index]).await
    }

    pub async fn set_volume(self, track_index: u32, volume: f32) -> Result<(), Error> {
        self.client.put(&SET_VOLUME, &[track_index], vec![float(volume)]).await
    }

    pub async fn get_panning(self, track_index: u32) -> Result<f32, Error> {
        self.client.get(&GET_PANNING, &[track_index]).await
    }

    pub async fn set_panning(self, track_index: u32, panning: f32) -> Result<(), Error> {
        self.client.put(&SET_PANNING, &[track_index], vec![float(panning)]).await
    }

    pub async fn get_mute(self, track_index: u32) -> Result<bool, Error> {
        self.client.get(&GET_MUTE, &[track_index]).await
    }

    pub async fn set_mute(self, track_index: u32, muted: bool) -> Result<(), Error> {
        self.client.put(&SET_MUTE, &[track_index], vec![boolean(muted)]).await
    }

    pub async fn get_solo(self, track_index: u32) -> Result<bool, Error> {
        self.client.get(&GET_SOLO, &[track_index]).await
    }

    pub async fn set_solo(self, track_index: u32, soloed: bool) -> Result<(), Error> {
        self.client.put(&SET_SOLO, &[track_index], vec![boolean(soloed)]).await
    }

    pub async fn get_arm(self, track_index: u32) -> Result<bool, Error> {
        self.client.get(&GET_ARM, &[track_index]).await
    }

    pub async fn set_arm(self, track_index: u32, armed: bool) -> Result<(), Error> {
        self.client.put(&SET_ARM, &[track_index], vec![boolean(armed)]).await
    }

    pub async fn get_color(self, track_index: u32) -> Result<i32, Error> {
        self.client.get(&GET_COLOR, &[track_index]).await
    }

    pub async fn set_color(self, track_index: u32, rgb: u32) -> Result<(), Error> {
        let rgb = payload::index("color", rgb)?;
        self.client.put(&SET_COLOR, &[track_index], vec![int(rgb)]).await
    }

    pub async fn get_num_devices(self, track_index: u32) -> Result<u32, Error> {
        self.client.get(&GET_NUM_DEVICES, &[track_index]).await
    }

    pub async fn get_device_names(self, track_index: u32) -> Result<Vec<String>, Error> {
        let names = self.client.execute(&GET_DEVICE_NAMES, &[track_index], Vec::new()).await?;
        payload::list(GET_DEVICE_NAMES.address, &names)
    }

    pub async fn stop_all_clips(self, track_index: u32) -> Result<(), Error> {
        self.client.put(&STOP_ALL_CLIPS, &[track_index], vec![]).await
    }

    /// Loads the first browser item whose name contains `device_name`
    /// (case-insensitive) at the end of the track's device chain.
    ///
    /// # Returns
    /// The new device's index, or `None` when the browser has no match.
    pub async fn insert_device(self, track_index: u32, device_name: &str) -> Result<Option<u32>, Error> {
        let reply = self
            .client
            .execute(&INSERT_DEVICE, &[track_index], vec![string(device_name)])
            .await?;
        let index: i32 = payload::scalar(INSERT_DEVICE.address, &reply)?;
        if index < 0 {
            log::warn!("No device named {:?} found for track {}", device_name, track_index);
        }
        Ok(u32::try_from(index).ok())
    }

    pub async fn get_send(self, track_index: u32, send_index: u32) -> Result<f32, Error> {
        self.client.get(&GET_SEND, &[track_index, send_index]).await
    }

    pub async fn set_send(self, track_index: u32, send_index: u32, value: f32) -> Result<(), Error> {
        self.client.put(&SET_SEND, &[track_index, send_index], vec![float(value)]).await
    }

    /// Starts volume notifications for one track. Updates arrive on
    /// `/live/track/get/volume` as `(track_index, volume)`; other tracks'
    /// updates are not included.
    pub async fn listen_volume(self, track_index: u32) -> Result<Updates, Error> {
        let updates = self.client.listen(&GET_VOLUME, &[track_index])?;
        self.client.put(&START_LISTEN_VOLUME, &[track_index], vec![]).await?;
        Ok(updates)
    }

    pub async fn stop_listen_volume(self, track_index: u32) -> Result<(), Error> {
        self.client.put(&STOP_LISTEN_VOLUME, &[track_index], vec![]).await?;
        self.client.unlisten(&GET_VOLUME, &[track_index])
    }
}
