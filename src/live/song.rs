//! `/live/song/*`: tempo, transport, structure and other global state.

use crate::{
    payload::{boolean, float, int, string},
    ArgType::{self, *},
    Error, Level, Operation, Param, Shape, Updates,
};
use crate::AbletonOSC;

const L: Level = Level::Song;

const TEMPO: &[Param] = &[Param::new("tempo", Float).between(20.0, 999.0)];
const ENABLED: &[Param] = &[Param::new("enabled", ArgType::Bool)];
const INSERT_AT: &[Param] = &[Param::new("index", Int)];
const TRACK: &[Param] = &[Param::new("track_index", Index)];

pub const GET_TEMPO: Operation = Operation::get("song_get_tempo", "/live/song/get/tempo", L, Shape::Float, "Song tempo in BPM.");
pub const SET_TEMPO: Operation = Operation::set("song_set_tempo", "/live/song/set/tempo", L, TEMPO, "Set the song tempo in BPM (20-999).");
pub const TAP_TEMPO: Operation = Operation::action("song_tap_tempo", "/live/song/tap_tempo", L, &[], "Tap the tempo once.");

pub const GET_IS_PLAYING: Operation = Operation::get("song_get_is_playing", "/live/song/get/is_playing", L, Shape::Bool, "Whether the transport is running.");
pub const START_PLAYING: Operation = Operation::action("song_start_playing", "/live/song/start_playing", L, &[], "Start playback.");
pub const STOP_PLAYING: Operation = Operation::action("song_stop_playing", "/live/song/stop_playing", L, &[], "Stop playback.");
pub const CONTINUE_PLAYING: Operation = Operation::action("song_continue_playing", "/live/song/continue_playing", L, &[], "Continue playback from the current position.");

pub const GET_SIGNATURE_NUMERATOR: Operation = Operation::get("song_get_signature_numerator", "/live/song/get/signature_numerator", L, Shape::Int, "Time signature numerator.");
pub const SET_SIGNATURE_NUMERATOR: Operation = Operation::set(
    "song_set_signature_numerator",
    "/live/song/set/signature_numerator",
    L,
    &[Param::new("numerator", Int).between(1.0, 99.0)],
    "Set the time signature numerator (1-99).",
);
pub const GET_SIGNATURE_DENOMINATOR: Operation = Operation::get("song_get_signature_denominator", "/live/song/get/signature_denominator", L, Shape::Int, "Time signature denominator.");
pub const SET_SIGNATURE_DENOMINATOR: Operation = Operation::set(
    "song_set_signature_denominator",
    "/live/song/set/signature_denominator",
    L,
    &[Param::new("denominator", Int).between(1.0, 16.0)],
    "Set the time signature denominator (1, 2, 4, 8 or 16).",
);

pub const GET_NUM_TRACKS: Operation = Operation::get("song_get_num_tracks", "/live/song/get/num_tracks", L, Shape::Int, "Number of tracks.");
pub const GET_NUM_SCENES: Operation = Operation::get("song_get_num_scenes", "/live/song/get/num_scenes", L, Shape::Int, "Number of scenes.");

pub const GET_CURRENT_SONG_TIME: Operation = Operation::get("song_get_current_song_time", "/live/song/get/current_song_time", L, Shape::Float, "Playback position in beats.");
pub const SET_CURRENT_SONG_TIME: Operation = Operation::set(
    "song_set_current_song_time",
    "/live/song/set/current_song_time",
    L,
    &[Param::new("beats", Float).between(0.0, f64::MAX)],
    "Move the playback position, in beats.",
);

pub const GET_METRONOME: Operation = Operation::get("song_get_metronome", "/live/song/get/metronome", L, Shape::Bool, "Whether the metronome is on.");
pub const SET_METRONOME: Operation = Operation::set("song_set_metronome", "/live/song/set/metronome", L, ENABLED, "Turn the metronome on or off.");
pub const GET_RECORD_MODE: Operation = Operation::get("song_get_record_mode", "/live/song/get/record_mode", L, Shape::Bool, "Whether arrangement record is on.");
pub const SET_RECORD_MODE: Operation = Operation::set("song_set_record_mode", "/live/song/set/record_mode", L, ENABLED, "Turn arrangement record on or off.");

pub const GET_GROOVE_AMOUNT: Operation = Operation::get("song_get_groove_amount", "/live/song/get/groove_amount", L, Shape::Float, "Global groove amount (0-1).");
pub const SET_GROOVE_AMOUNT: Operation = Operation::set(
    "song_set_groove_amount",
    "/live/song/set/groove_amount",
    L,
    &[Param::new("amount", Float).between(0.0, 1.0)],
    "Set the global groove amount (0-1).",
);
pub const GET_ROOT_NOTE: Operation = Operation::get("song_get_root_note", "/live/song/get/root_note", L, Shape::Int, "Song key root as a pitch class (0 = C).");
pub const SET_ROOT_NOTE: Operation = Operation::set(
    "song_set_root_note",
    "/live/song/set/root_note",
    L,
    &[Param::new("root_note", Int).between(0.0, 11.0)],
    "Set the song key root as a pitch class (0 = C, 11 = B).",
);
pub const GET_SCALE_NAME: Operation = Operation::get("song_get_scale_name", "/live/song/get/scale_name", L, Shape::Str, "Song scale name.");
pub const SET_SCALE_NAME: Operation = Operation::set(
    "song_set_scale_name",
    "/live/song/set/scale_name",
    L,
    &[Param::new("scale_name", Str)],
    "Set the song scale by name, e.g. \"Minor\".",
);

pub const CREATE_MIDI_TRACK: Operation = Operation::action("song_create_midi_track", "/live/song/create_midi_track", L, INSERT_AT, "Create a MIDI track at index (-1 appends).");
pub const CREATE_AUDIO_TRACK: Operation = Operation::action("song_create_audio_track", "/live/song/create_audio_track", L, INSERT_AT, "Create an audio track at index (-1 appends).");
pub const CREATE_RETURN_TRACK: Operation = Operation::action("song_create_return_track", "/live/song/create_return_track", L, &[], "Create a return track.");
pub const DELETE_TRACK: Operation = Operation::action("song_delete_track", "/live/song/delete_track", L, TRACK, "Delete the track at index.");
pub const DELETE_RETURN_TRACK: Operation = Operation::action("song_delete_return_track", "/live/song/delete_return_track", L, TRACK, "Delete the return track at index.");
pub const DUPLICATE_TRACK: Operation = Operation::action("song_duplicate_track", "/live/song/duplicate_track", L, TRACK, "Duplicate the track at index.");
pub const CREATE_SCENE: Operation = Operation::action("song_create_scene", "/live/song/create_scene", L, INSERT_AT, "Create a scene at index (-1 appends).");
pub const DELETE_SCENE: Operation = Operation::action("song_delete_scene", "/live/song/delete_scene", L, &[Param::new("scene_index", Index)], "Delete the scene at index.");

pub const UNDO: Operation = Operation::action("song_undo", "/live/song/undo", L, &[], "Undo the last action.");
pub const REDO: Operation = Operation::action("song_redo", "/live/song/redo", L, &[], "Redo the last undone action.");
pub const CAN_UNDO: Operation = Operation::get("song_can_undo", "/live/song/get/can_undo", L, Shape::Bool, "Whether there is something to undo.");
pub const CAN_REDO: Operation = Operation::get("song_can_redo", "/live/song/get/can_redo", L, Shape::Bool, "Whether there is something to redo.");

pub const STOP_ALL_CLIPS: Operation = Operation::action("song_stop_all_clips", "/live/song/stop_all_clips", L, &[], "Stop every playing clip.");
pub const CAPTURE_MIDI: Operation = Operation::action("song_capture_midi", "/live/song/capture_midi", L, &[], "Capture recently played MIDI into a clip.");

const START_LISTEN_TEMPO: Operation = Operation::action("song_start_listen_tempo", "/live/song/start_listen/tempo", L, &[], "");
const STOP_LISTEN_TEMPO: Operation = Operation::action("song_stop_listen_tempo", "/live/song/stop_listen/tempo", L, &[], "");
const START_LISTEN_IS_PLAYING: Operation = Operation::action("song_start_listen_is_playing", "/live/song/start_listen/is_playing", L, &[], "");
const STOP_LISTEN_IS_PLAYING: Operation = Operation::action("song_stop_listen_is_playing", "/live/song/stop_listen/is_playing", L, &[], "");

pub const OPERATIONS: &[Operation] = &[
    GET_TEMPO,
    SET_TEMPO,
    TAP_TEMPO,
    GET_IS_PLAYING,
    START_PLAYING,
    STOP_PLAYING,
    CONTINUE_PLAYING,
    GET_SIGNATURE_NUMERATOR,
    SET_SIGNATURE_NUMERATOR,
    GET_SIGNATURE_DENOMINATOR,
    SET_SIGNATURE_DENOMINATOR,
    GET_NUM_TRACKS,
    GET_NUM_SCENES,
    GET_CURRENT_SONG_TIME,
    SET_CURRENT_SONG_TIME,
    GET_METRONOME,
    SET_METRONOME,
    GET_RECORD_MODE,
    SET_RECORD_MODE,
    GET_GROOVE_AMOUNT,
    SET_GROOVE_AMOUNT,
    GET_ROOT_NOTE,
    SET_ROOT_NOTE,
    GET_SCALE_NAME,
    SET_SCALE_NAME,
    CREATE_MIDI_TRACK,
    CREATE_AUDIO_TRACK,
    CREATE_RETURN_TRACK,
    DELETE_TRACK,
    DELETE_RETURN_TRACK,
    DUPLICATE_TRACK,
    CREATE_SCENE,
    DELETE_SCENE,
    UNDO,
    REDO,
    CAN_UNDO,
    CAN_REDO,
    STOP_ALL_CLIPS,
    CAPTURE_MIDI,
];

/// Song-level operations.
#[derive(Clone, Copy)]
pub struct Song<'a> {
    client: &'a AbletonOSC,
}

impl<'a> Song<'a> {
    pub(crate) fn new(client: &'a AbletonOSC) -> Self {
        Song { client }
    }

    pub async fn get_tempo(self) -> Result<f32, Error> {
        self.client.get(&GET_TEMPO, &[]).await
    }

    pub async fn set_tempo(self, bpm: f32) -> Result<(), Error> {
        self.client.put(&SET_TEMPO, &[], vec![float(bpm)]).await
    }

    pub async fn tap_tempo(self) -> Result<(), Error> {
        self.client.put(&TAP_TEMPO, &[], vec![]).await
    }

    pub async fn get_is_playing(self) -> Result<bool, Error> {
        self.client.get(&GET_IS_PLAYING, &[]).await
    }

    pub async fn start_playing(self) -> Result<(), Error> {
        self.client.put(&START_PLAYING, &[], vec![]).await
    }

    pub async fn stop_playing(self) -> Result<(), Error> {
        self.client.put(&STOP_PLAYING, &[], vec![]).await
    }

    pub async fn continue_playing(self) -> Result<(), Error> {
        self.client.put(&CONTINUE_PLAYING, &[], vec![]).await
    }

    pub async fn get_signature_numerator(self) -> Result<i32, Error> {
        self.client.get(&GET_SIGNATURE_NUMERATOR, &[]).await
    }

    pub async fn set_signature_numerator(self, numerator: i32) -> Result<(), Error> {
        self.client.put(&SET_SIGNATURE_NUMERATOR, &[], vec![int(numerator)]).await
    }

    pub async fn get_signature_denominator(self) -> Result<i32, Error> {
        self.client.get(&GET_SIGNATURE_DENOMINATOR, &[]).await
    }

    /// `denominator` must be a power of two up to 16.
    pub async fn set_signature_denominator(self, denominator: i32) -> Result<(), Error> {
        if !matches!(denominator, 1 | 2 | 4 | 8 | 16) {
            return Err(Error::validation("denominator", format!("{denominator} is not 1, 2, 4, 8 or 16")));
        }
        self.client.put(&SET_SIGNATURE_DENOMINATOR, &[], vec![int(denominator)]).await
    }

    pub async fn get_num_tracks(self) -> Result<u32, Error> {
        self.client.get(&GET_NUM_TRACKS, &[]).await
    }

    pub async fn get_num_scenes(self) -> Result<u32, Error> {
        self.client.get(&GET_NUM_SCENES, &[]).await
    }

    pub async fn get_current_song_time(self) -> Result<f32, Error> {
        self.client.get(&GET_CURRENT_SONG_TIME, &[]).await
    }

    pub async fn set_current_song_time(self, beats: f32) -> Result<(), Error> {
        self.client.put(&SET_CURRENT_SONG_TIME, &[], vec![float(beats)]).await
    }

    pub async fn get_metronome(self) -> Result<bool, Error> {
        self.client.get(&GET_METRONOME, &[]).await
    }

    pub async fn set_metronome(self, enabled: bool) -> Result<(), Error> {
        self.client.put(&SET_METRONOME, &[], vec![boolean(enabled)]).await
    }

    pub async fn get_record_mode(self) -> Result<bool, Error> {
        self.client.get(&GET_RECORD_MODE, &[]).await
    }

    pub async fn set_record_mode(self, enabled: bool) -> Result<(), Error> {
        self.client.put(&SET_RECORD_MODE, &[], vec![boolean(enabled)]).await
    }

    pub async fn get_groove_amount(self) -> Result<f32, Error> {
        self.client.get(&GET_GROOVE_AMOUNT, &[]).await
    }

    pub async fn set_groove_amount(self, amount: f32) -> Result<(), Error> {
        self.client.put(&SET_GROOVE_AMOUNT, &[], vec![float(amount)]).await
    }

    pub async fn get_root_note(self) -> Result<i32, Error> {
        self.client.get(&GET_ROOT_NOTE, &[]).await
    }

    pub async fn set_root_note(self, pitch_class: i32) -> Result<(), Error> {
        self.client.put(&SET_ROOT_NOTE, &[], vec![int(pitch_class)]).await
    }

    pub async fn get_scale_name(self) -> Result<String, Error> {
        self.client.get(&GET_SCALE_NAME, &[]).await
    }

    pub async fn set_scale_name(self, name: &str) -> Result<(), Error> {
        self.client.put(&SET_SCALE_NAME, &[], vec![string(name)]).await
    }

    /// Creates a MIDI track at `index`, or at the end when `index` is `None`.
    pub async fn create_midi_track(self, index: Option<u32>) -> Result<(), Error> {
        let at = insert_position(index)?;
        self.client.put(&CREATE_MIDI_TRACK, &[], vec![int(at)]).await
    }

    pub async fn create_audio_track(self, index: Option<u32>) -> Result<(), Error> {
        let at = insert_position(index)?;
        self.client.put(&CREATE_AUDIO_TRACK, &[], vec![int(at)]).await
    }

    pub async fn create_return_track(self) -> Result<(), Error> {
        self.client.put(&CREATE_RETURN_TRACK, &[], vec![]).await
    }

    pub async fn delete_track(self, track_index: u32) -> Result<(), Error> {
        let index = crate::payload::index("track_index", track_index)?;
        self.client.put(&DELETE_TRACK, &[], vec![int(index)]).await
    }

    pub async fn delete_return_track(self, index: u32) -> Result<(), Error> {
        let index = crate::payload::index("track_index", index)?;
        self.client.put(&DELETE_RETURN_TRACK, &[], vec![int(index)]).await
    }

    pub async fn duplicate_track(self, track_index: u32) -> Result<(), Error> {
        let index = crate::payload::index("track_index", track_index)?;
        self.client.put(&DUPLICATE_TRACK, &[], vec![int(index)]).await
    }

    pub async fn create_scene(self, index: Option<u32>) -> Result<(), Error> {
        let at = insert_position(index)?;
        self.client.put(&CREATE_SCENE, &[], vec![int(at)]).await
    }

    pub async fn delete_scene(self, scene_index: u32) -> Result<(), Error> {
        let index = crate::payload::index("scene_index", scene_index)?;
        self.client.put(&DELETE_SCENE, &[], vec![int(index)]).await
    }

    pub async fn undo(self) -> Result<(), Error> {
        self.client.put(&UNDO, &[], vec![]).await
    }

    pub async fn redo(self) -> Result<(), Error> {
        self.client.put(&REDO, &[], vec![]).await
    }

    pub async fn can_undo(self) -> Result<bool, Error> {
        self.client.get(&CAN_UNDO, &[]).await
    }

    pub async fn can_redo(self) -> Result<bool, Error> {
        self.client.get(&CAN_REDO, &[]).await
    }

    pub async fn stop_all_clips(self) -> Result<(), Error> {
        self.client.put(&STOP_ALL_CLIPS, &[], vec![]).await
    }

    pub async fn capture_midi(self) -> Result<(), Error> {
        self.client.put(&CAPTURE_MIDI, &[], vec![]).await
    }

    /// Starts tempo change notifications. Each update arrives on
    /// `/live/song/get/tempo` with the new tempo.
    pub async fn listen_tempo(self) -> Result<Updates, Error> {
        let updates = self.client.listen(&GET_TEMPO, &[])?;
        self.client.put(&START_LISTEN_TEMPO, &[], vec![]).await?;
        Ok(updates)
    }

    /// Stops tempo notifications and ends the streams `listen_tempo` returned.
    pub async fn stop_listen_tempo(self) -> Result<(), Error> {
        self.client.put(&STOP_LISTEN_TEMPO, &[], vec![]).await?;
        self.client.unlisten(&GET_TEMPO, &[])
    }

    pub async fn listen_is_playing(self) -> Result<Updates, Error> {
        let updates = self.client.listen(&GET_IS_PLAYING, &[])?;
        self.client.put(&START_LISTEN_IS_PLAYING, &[], vec![]).await?;
        Ok(updates)
    }

    pub async fn stop_listen_is_playing(self) -> Result<(), Error> {
        self.client.put(&STOP_LISTEN_IS_PLAYING, &[], vec![]).await?;
        self.client.unlisten(&GET_IS_PLAYING, &[])
    }
}

/// `-1` tells Live to append.
fn insert_position(index: Option<u32>) -> Result<i32, Error> {
    match index {
        Some(index) => crate::payload::index("index", index),
        None => Ok(-1),
    }
}
