//! `/live/clip/*`: properties, playback and MIDI notes of one clip.
//!
//! Clips are addressed by `(track_index, clip_index)`, where `clip_index`
//! is the scene row of the slot holding the clip.

use rosc::OscType;
use serde::{Deserialize, Serialize};

use crate::{
    operation::NOTE_FIELDS,
    payload::{self, boolean, float, int, string},
    AbletonOSC,
    ArgType::{self, *},
    Error, Level, Operation, Param, Shape,
};

const L: Level = Level::Clip;

/// One MIDI note. Times are in beats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: u8,
    pub start_time: f32,
    pub duration: f32,
    pub velocity: u8,
    #[serde(default)]
    pub mute: bool,
}

impl Note {
    pub fn new(pitch: u8, start_time: f32, duration: f32, velocity: u8) -> Self {
        Note {
            pitch,
            start_time,
            duration,
            velocity,
            mute: false,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        payload::in_range("pitch", self.pitch, 0, 127)?;
        payload::in_range("velocity", self.velocity, 0, 127)?;
        if payload::finite("start_time", self.start_time)? < 0.0 {
            return Err(Error::validation("start_time", format!("{} is negative", self.start_time)));
        }
        if payload::finite("duration", self.duration)? <= 0.0 {
            return Err(Error::validation("duration", format!("{} is not positive", self.duration)));
        }
        Ok(())
    }

    fn encode(&self, out: &mut Vec<OscType>) {
        out.extend([
            int(self.pitch as i32),
            float(self.start_time),
            float(self.duration),
            int(self.velocity as i32),
            boolean(self.mute),
        ]);
    }

    /// Flattens `notes` into the five-values-per-note layout the bridge
    /// reads, validating each note.
    pub fn encode_all(notes: &[Note]) -> Result<Vec<OscType>, Error> {
        let mut args = Vec::with_capacity(notes.len() * NOTE_FIELDS);
        for note in notes {
            note.validate()?;
            note.encode(&mut args);
        }
        Ok(args)
    }

    /// Reads a `get/notes` payload (after the index prefix).
    pub fn decode_all(address: &str, values: &[OscType]) -> Result<Vec<Note>, Error> {
        if values.len() % NOTE_FIELDS != 0 {
            return Err(Error::unexpected(
                address,
                format!("{} values is not a whole number of notes", values.len()),
            ));
        }
        values
            .chunks_exact(NOTE_FIELDS)
            .enumerate()
            .map(|(n, chunk)| {
                let pitch: u32 = payload::value_at(address, chunk, 0)?;
                let velocity: f32 = payload::value_at(address, chunk, 3)?;
                Ok(Note {
                    pitch: u8::try_from(pitch)
                        .map_err(|_| Error::unexpected(address, format!("note {n}: pitch {pitch} out of range")))?,
                    start_time: payload::value_at(address, chunk, 1)?,
                    duration: payload::value_at(address, chunk, 2)?,
                    velocity: velocity.round().clamp(0.0, 127.0) as u8,
                    mute: payload::value_at(address, chunk, 4)?,
                })
            })
            .collect()
    }
}

/// Warp modes as Live numbers them. 5 is unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarpMode {
    Beats = 0,
    Tones = 1,
    Texture = 2,
    RePitch = 3,
    Complex = 4,
    ComplexPro = 6,
}

impl TryFrom<i32> for WarpMode {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Error> {
        Ok(match value {
            0 => WarpMode::Beats,
            1 => WarpMode::Tones,
            2 => WarpMode::Texture,
            3 => WarpMode::RePitch,
            4 => WarpMode::Complex,
            6 => WarpMode::ComplexPro,
            other => return Err(Error::validation("warp_mode", format!("{other} is not a warp mode"))),
        })
    }
}

const BEATS: &[Param] = &[Param::new("beats", Float).between(0.0, f64::MAX)];

pub const GET_NAME: Operation = Operation::get("clip_get_name", "/live/clip/get/name", L, Shape::Str, "Clip name.");
pub const SET_NAME: Operation = Operation::set("clip_set_name", "/live/clip/set/name", L, &[Param::new("name", Str)], "Rename a clip.");
pub const FIRE: Operation = Operation::action("clip_fire", "/live/clip/fire", L, &[], "Launch a clip.");
pub const STOP: Operation = Operation::action("clip_stop", "/live/clip/stop", L, &[], "Stop a clip.");
pub const GET_LENGTH: Operation = Operation::get("clip_get_length", "/live/clip/get/length", L, Shape::Float, "Clip length in beats.");
pub const IS_MIDI_CLIP: Operation = Operation::get("clip_is_midi_clip", "/live/clip/get/is_midi_clip", L, Shape::Bool, "Whether this is a MIDI clip.");
pub const IS_AUDIO_CLIP: Operation = Operation::get("clip_is_audio_clip", "/live/clip/get/is_audio_clip", L, Shape::Bool, "Whether this is an audio clip.");
pub const IS_PLAYING: Operation = Operation::get("clip_is_playing", "/live/clip/get/is_playing", L, Shape::Bool, "Whether the clip is playing.");
pub const GET_COLOR: Operation = Operation::get("clip_get_color", "/live/clip/get/color", L, Shape::Int, "Clip color as 0xRRGGBB.");
pub const SET_COLOR: Operation = Operation::set(
    "clip_set_color",
    "/live/clip/set/color",
    L,
    &[Param::new("color", Int).between(0.0, 16_777_215.0)],
    "Set clip color as 0xRRGGBB.",
);
pub const GET_NOTES: Operation = Operation::get("clip_get_notes", "/live/clip/get/notes", L, Shape::Notes, "Every note in a MIDI clip.");
pub const ADD_NOTES: Operation = Operation::action(
    "clip_add_notes",
    "/live/clip/add/notes",
    L,
    &[Param::new("notes", Notes)],
    "Add notes to a MIDI clip. Each note is {pitch, start_time, duration, velocity, mute}.",
);
pub const REMOVE_NOTES: Operation = Operation::action(
    "clip_remove_notes",
    "/live/clip/remove/notes",
    L,
    &[
        Param::new("start_time", Float).between(0.0, f64::MAX),
        Param::new("pitch_start", Int).between(0.0, 127.0),
        Param::new("time_span", Float).positive(),
        Param::new("pitch_span", Int).between(1.0, 128.0),
    ],
    "Remove the notes inside a time and pitch window.",
);
pub const GET_LOOP_START: Operation = Operation::get("clip_get_loop_start", "/live/clip/get/loop_start", L, Shape::Float, "Loop start in beats.");
pub const SET_LOOP_START: Operation = Operation::set("clip_set_loop_start", "/live/clip/set/loop_start", L, BEATS, "Set the loop start in beats.");
pub const GET_LOOP_END: Operation = Operation::get("clip_get_loop_end", "/live/clip/get/loop_end", L, Shape::Float, "Loop end in beats.");
pub const SET_LOOP_END: Operation = Operation::set("clip_set_loop_end", "/live/clip/set/loop_end", L, BEATS, "Set the loop end in beats.");
pub const GET_START_TIME: Operation = Operation::get("clip_get_start_time", "/live/clip/get/start_time", L, Shape::Float, "Clip start marker in beats.");
pub const SET_START_TIME: Operation = Operation::set("clip_set_start_time", "/live/clip/set/start_time", L, BEATS, "Set the start marker in beats.");
pub const GET_END_TIME: Operation = Operation::get("clip_get_end_time", "/live/clip/get/end_time", L, Shape::Float, "Clip end marker in beats.");
pub const SET_END_TIME: Operation = Operation::set("clip_set_end_time", "/live/clip/set/end_time", L, BEATS, "Set the end marker in beats.");
pub const GET_LOOPING: Operation = Operation::get("clip_get_looping", "/live/clip/get/looping", L, Shape::Bool, "Whether the clip loops.");
pub const SET_LOOPING: Operation = Operation::set("clip_set_looping", "/live/clip/set/looping", L, &[Param::new("enabled", ArgType::Bool)], "Turn looping on or off.");
pub const DUPLICATE_LOOP: Operation = Operation::action("clip_duplicate_loop", "/live/clip/duplicate_loop", L, &[], "Double the loop, copying its notes.");
pub const GET_WARP_MODE: Operation = Operation::get("clip_get_warp_mode", "/live/clip/get/warp_mode", L, Shape::Int, "Warp mode of an audio clip.");
pub const SET_WARP_MODE: Operation = Operation::set(
    "clip_set_warp_mode",
    "/live/clip/set/warp_mode",
    L,
    &[Param::new("warp_mode", Int).between(0.0, 6.0)],
    "Set the warp mode (0 beats, 1 tones, 2 texture, 3 re-pitch, 4 complex, 6 complex pro).",
);
pub const GET_PITCH_COARSE: Operation = Operation::get("clip_get_pitch_coarse", "/live/clip/get/pitch_coarse", L, Shape::Int, "Transposition in semitones.");
pub const SET_PITCH_COARSE: Operation = Operation::set(
    "clip_set_pitch_coarse",
    "/live/clip/set/pitch_coarse",
    L,
    &[Param::new("semitones", Int).between(-48.0, 48.0)],
    "Transpose an audio clip (-48 to 48 semitones).",
);
pub const GET_PITCH_FINE: Operation = Operation::get("clip_get_pitch_fine", "/live/clip/get/pitch_fine", L, Shape::Float, "Fine tuning in cents.");
pub const SET_PITCH_FINE: Operation = Operation::set(
    "clip_set_pitch_fine",
    "/live/clip/set/pitch_fine",
    L,
    &[Param::new("cents", Float).between(-50.0, 50.0)],
    "Fine-tune an audio clip (-50 to 50 cents).",
);

pub const OPERATIONS: &[Operation] = &[
    GET_NAME,
    SET_NAME,
    FIRE,
    STOP,
    GET_LENGTH,
    IS_MIDI_CLIP,
    IS_AUDIO_CLIP,
    IS_PLAYING,
    GET_COLOR,
    SET_COLOR,
    GET_NOTES,
    ADD_NOTES,
    REMOVE_NOTES,
    GET_LOOP_START,
    SET_LOOP_START,
    GET_LOOP_END,
    SET_LOOP_END,
    GET_START_TIME,
    SET_START_TIME,
    GET_END_TIME,
    SET_END_TIME,
    GET_LOOPING,
    SET_LOOPING,
    DUPLICATE_LOOP,
    GET_WARP_MODE,
    SET_WARP_MODE,
    GET_PITCH_COARSE,
    SET_PITCH_COARSE,
    GET_PITCH_FINE,
    SET_PITCH_FINE,
];

#[derive(Clone, Copy)]
pub struct Clip<'a> {
    client: &'a AbletonOSC,
}

impl<'a> Clip<'a> {
    pub(crate) fn new(client: &'a AbletonOSC) -> Self {
        Clip { client }
    }

    pub async fn get_name(self, track_index: u32, clip_index: u32) -> Result<String, Error> {
        self.client.get(&GET_NAME, &[track_index, clip_index]).await
    }

    pub async fn set_name(self, track_index: u32, clip_index: u32, name: &str) -> Result<(), Error> {
        self.client.put(&SET_NAME, &[track_index, clip_index], vec![string(name)]).await
    }

    pub async fn fire(self, track_index: u32, clip_index: u32) -> Result<(), Error> {
        self.client.put(&FIRE, &[track_index, clip_index], vec![]).await
    }

    pub async fn stop(self, track_index: u32, clip_index: u32) -> Result<(), Error> {
        self.client.put(&STOP, &[track_index, clip_index], vec![]).await
    }

    pub async fn get_length(self, track_index: u32, clip_index: u32) -> Result<f32, Error> {
        self.client.get(&GET_LENGTH, &[track_index, clip_index]).await
    }

    pub async fn is_midi_clip(self, track_index: u32, clip_index: u32) -> Result<bool, Error> {
        self.client.get(&IS_MIDI_CLIP, &[track_index, clip_index]).await
    }

    pub async fn is_audio_clip(self, track_index: u32, clip_index: u32) -> Result<bool, Error> {
        self.client.get(&IS_AUDIO_CLIP, &[track_index, clip_index]).await
    }

    pub async fn is_playing(self, track_index: u32, clip_index: u32) -> Result<bool, Error> {
        self.client.get(&IS_PLAYING, &[track_index, clip_index]).await
    }

    pub async fn get_color(self, track_index: u32, clip_index: u32) -> Result<i32, Error> {
        self.client.get(&GET_COLOR, &[track_index, clip_index]).await
    }

    pub async fn set_color(self, track_index: u32, clip_index: u32, rgb: u32) -> Result<(), Error> {
        let rgb = payload::index("color", rgb)?;
        self.client.put(&SET_COLOR, &[track_index, clip_index], vec![int(rgb)]).await
    }

    pub async fn get_notes(self, track_index: u32, clip_index: u32) -> Result<Vec<Note>, Error> {
        let values = self
            .client
            .execute(&GET_NOTES, &[track_index, clip_index], Vec::new())
            .await?;
        Note::decode_all(GET_NOTES.address, &values)
    }

    pub async fn add_notes(self, track_index: u32, clip_index: u32, notes: &[Note]) -> Result<(), Error> {
        let args = Note::encode_all(notes)?;
        self.client.put(&ADD_NOTES, &[track_index, clip_index], args).await
    }

    /// Removes notes starting in `start_time..end_time` (beats) with a
    /// pitch in `pitch_start..=pitch_end`.
    pub async fn remove_notes(
        self,
        track_index: u32,
        clip_index: u32,
        start_time: f32,
        end_time: f32,
        pitch_start: u8,
        pitch_end: u8,
    ) -> Result<(), Error> {
        let start_time = payload::finite("start_time", start_time)?;
        let end_time = payload::finite("end_time", end_time)?;
        if end_time <= start_time {
            return Err(Error::validation("end_time", format!("{end_time} is not after {start_time}")));
        }
        if pitch_end < pitch_start || pitch_end > 127 {
            return Err(Error::validation("pitch_end", format!("{pitch_end} is not in {pitch_start}..=127")));
        }
        let args = vec![
            float(start_time),
            int(pitch_start as i32),
            float(end_time - start_time),
            int(pitch_end as i32 - pitch_start as i32 + 1),
        ];
        self.client.put(&REMOVE_NOTES, &[track_index, clip_index], args).await
    }

    /// Removes every note in the clip.
    pub async fn clear_notes(self, track_index: u32, clip_index: u32) -> Result<(), Error> {
        let length = self.get_length(track_index, clip_index).await?;
        self.remove_notes(track_index, clip_index, 0.0, length.max(f32::EPSILON), 0, 127)
            .await
    }

    pub async fn get_loop_start(self, track_index: u32, clip_index: u32) -> Result<f32, Error> {
        self.client.get(&GET_LOOP_START, &[track_index, clip_index]).await
    }

    pub async fn set_loop_start(self, track_index: u32, clip_index: u32, beats: f32) -> Result<(), Error> {
        self.client.put(&SET_LOOP_START, &[track_index, clip_index], vec![float(beats)]).await
    }

    pub async fn get_loop_end(self, track_index: u32, clip_index: u32) -> Result<f32, Error> {
        self.client.get(&GET_LOOP_END, &[track_index, clip_index]).await
    }

    pub async fn set_loop_end(self, track_index: u32, clip_index: u32, beats: f32) -> Result<(), Error> {
        self.client.put(&SET_LOOP_END, &[track_index, clip_index], vec![float(beats)]).await
    }

    pub async fn get_start_time(self, track_index: u32, clip_index: u32) -> Result<f32, Error> {
        self.client.get(&GET_START_TIME, &[track_index, clip_index]).await
    }

    pub async fn set_start_time(self, track_index: u32, clip_index: u32, beats: f32) -> Result<(), Error> {
        self.client.put(&SET_START_TIME, &[track_index, clip_index], vec![float(beats)]).await
    }

    pub async fn get_end_time(self, track_index: u32, clip_index: u32) -> Result<f32, Error> {
        self.client.get(&GET_END_TIME, &[track_index, clip_index]).await
    }

    pub async fn set_end_time(self, track_index: u32, clip_index: u32, beats: f32) -> Result<(), Error> {
        self.client.put(&SET_END_TIME, &[track_index, clip_index], vec![float(beats)]).await
    }

    pub async fn get_looping(self, track_index: u32, clip_index: u32) -> Result<bool, Error> {
        self.client.get(&GET_LOOPING, &[track_index, clip_index]).await
    }

    pub async fn set_looping(self, track_index: u32, clip_index: u32, enabled: bool) -> Result<(), Error> {
        self.client.put(&SET_LOOPING, &[track_index, clip_index], vec![boolean(enabled)]).await
    }

    pub async fn duplicate_loop(self, track_index: u32, clip_index: u32) -> Result<(), Error> {
        self.client.put(&DUPLICATE_LOOP, &[track_index, clip_index], vec![]).await
    }

    pub async fn get_warp_mode(self, track_index: u32, clip_index: u32) -> Result<WarpMode, Error> {
        let mode: i32 = self.client.get(&GET_WARP_MODE, &[track_index, clip_index]).await?;
        WarpMode::try_from(mode).map_err(|_| Error::unexpected(GET_WARP_MODE.address, format!("unknown warp mode {mode}")))
    }

    pub async fn set_warp_mode(self, track_index: u32, clip_index: u32, mode: WarpMode) -> Result<(), Error> {
        self.client
            .put(&SET_WARP_MODE, &[track_index, clip_index], vec![int(mode as i32)])
            .await
    }

    pub async fn get_pitch_coarse(self, track_index: u32, clip_index: u32) -> Result<i32, Error> {
        self.client.get(&GET_PITCH_COARSE, &[track_index, clip_index]).await
    }

    pub async fn set_pitch_coarse(self, track_index: u32, clip_index: u32, semitones: i32) -> Result<(), Error> {
        self.client
            .put(&SET_PITCH_COARSE, &[track_index, clip_index], vec![int(semitones)])
            .await
    }

    pub async fn get_pitch_fine(self, track_index: u32, clip_index: u32) -> Result<f32, Error> {
        self.client.get(&GET_PITCH_FINE, &[track_index, clip_index]).await
    }

    pub async fn set_pitch_fine(self, track_index: u32, clip_index: u32, cents: f32) -> Result<(), Error> {
        self.client
            .put(&SET_PITCH_FINE, &[track_index, clip_index], vec![float(cents)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_flatten_to_five_values() {
        let notes = [Note::new(60, 0.0, 1.0, 100), Note { mute: true, ..Note::new(64, 1.0, 0.5, 90) }];
        let args = Note::encode_all(&notes).unwrap();
        assert_eq!(args.len(), 10);
        assert_eq!(args[5], OscType::Int(64));
        assert_eq!(args[9], OscType::Int(1));
        assert_eq!(Note::decode_all("/live/clip/get/notes", &args).unwrap(), notes);
    }

    #[test]
    fn bad_notes_are_rejected_before_sending() {
        assert!(Note::new(128, 0.0, 1.0, 100).validate().is_err());
        assert!(Note::new(60, -1.0, 1.0, 100).validate().is_err());
        assert!(Note::new(60, 0.0, 0.0, 100).validate().is_err());
        assert!(Note::new(60, f32::NAN, 1.0, 100).validate().is_err());
    }

    #[test]
    fn partial_note_is_a_protocol_error() {
        let args = [OscType::Int(60), OscType::Float(0.0), OscType::Float(1.0)];
        assert!(matches!(
            Note::decode_all("/live/clip/get/notes", &args),
            Err(Error::UnexpectedReply { .. })
        ));
    }

    #[test]
    fn notes_read_from_json_default_to_unmuted() {
        let note: Note = serde_json::from_str(r#"{"pitch":60,"start_time":0,"duration":1,"velocity":100}"#).unwrap();
        assert_eq!(note, Note::new(60, 0.0, 1.0, 100));
    }

    #[test]
    fn warp_mode_five_does_not_exist() {
        assert_eq!(WarpMode::try_from(6).unwrap(), WarpMode::ComplexPro);
        assert!(WarpMode::try_from(5).is_err());
    }
}
