//! Pitch helpers for building note lists: note names, scales and chords.
//!
//! Octaves follow the convention where middle C (`C4`) is MIDI pitch 60.

use std::str::FromStr;

use crate::Error;

/// Pitch class (0 = C ... 11 = B) of a note name such as `C`, `F#` or `Bb`.
pub fn pitch_class(name: &str) -> Result<u8, Error> {
    let mut chars = name.trim().chars();
    let base: i32 = match chars.next().map(|c| c.to_ascii_uppercase()) {
        Some('C') => 0,
        Some('D') => 2,
        Some('E') => 4,
        Some('F') => 5,
        Some('G') => 7,
        Some('A') => 9,
        Some('B') => 11,
        _ => return Err(Error::validation("note", format!("{name:?} is not a note name"))),
    };
    let offset: i32 = chars
        .map(|c| match c {
            '#' | '♯' => Ok(1),
            'b' | '♭' => Ok(-1),
            _ => Err(Error::validation("note", format!("{name:?} is not a note name"))),
        })
        .sum::<Result<i32, Error>>()?;
    Ok((base + offset).rem_euclid(12) as u8)
}

/// MIDI pitch of `name` in `octave`, e.g. `("C", 4)` is 60 and `("D", 2)` 38.
pub fn note(name: &str, octave: i32) -> Result<u8, Error> {
    let pitch = (octave + 1) * 12 + pitch_class(name)? as i32;
    u8::try_from(pitch)
        .ok()
        .filter(|p| *p <= 127)
        .ok_or_else(|| Error::validation("octave", format!("{name}{octave} is outside the MIDI range")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleKind {
    Major,
    Minor,
    HarmonicMinor,
    Dorian,
    Mixolydian,
    PentatonicMajor,
    PentatonicMinor,
    Blues,
}

impl ScaleKind {
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleKind::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleKind::Minor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleKind::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            ScaleKind::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleKind::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleKind::PentatonicMajor => &[0, 2, 4, 7, 9],
            ScaleKind::PentatonicMinor => &[0, 3, 5, 7, 10],
            ScaleKind::Blues => &[0, 3, 5, 6, 7, 10],
        }
    }
}

impl FromStr for ScaleKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Ok(match s.to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "major" | "ionian" => ScaleKind::Major,
            "minor" | "natural_minor" | "aeolian" => ScaleKind::Minor,
            "harmonic_minor" => ScaleKind::HarmonicMinor,
            "dorian" => ScaleKind::Dorian,
            "mixolydian" => ScaleKind::Mixolydian,
            "pentatonic_major" | "major_pentatonic" => ScaleKind::PentatonicMajor,
            "pentatonic_minor" | "minor_pentatonic" => ScaleKind::PentatonicMinor,
            "blues" => ScaleKind::Blues,
            _ => return Err(Error::validation("scale", format!("unknown scale {s:?}"))),
        })
    }
}

/// One octave of `kind` starting at `root` in `octave`.
pub fn scale(root: &str, kind: ScaleKind, octave: i32) -> Result<Vec<u8>, Error> {
    let root = note(root, octave)?;
    Ok(stack(root, kind.intervals()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordKind {
    Major,
    Minor,
    Diminished,
    Augmented,
    Major7,
    Minor7,
    Dominant7,
    Sus2,
    Sus4,
}

impl ChordKind {
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordKind::Major => &[0, 4, 7],
            ChordKind::Minor => &[0, 3, 7],
            ChordKind::Diminished => &[0, 3, 6],
            ChordKind::Augmented => &[0, 4, 8],
            ChordKind::Major7 => &[0, 4, 7, 11],
            ChordKind::Minor7 => &[0, 3, 7, 10],
            ChordKind::Dominant7 => &[0, 4, 7, 10],
            ChordKind::Sus2 => &[0, 2, 7],
            ChordKind::Sus4 => &[0, 5, 7],
        }
    }
}

impl FromStr for ChordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Ok(match s {
            "maj" | "major" | "M" => ChordKind::Major,
            "min" | "minor" | "m" => ChordKind::Minor,
            "dim" => ChordKind::Diminished,
            "aug" => ChordKind::Augmented,
            "maj7" | "M7" => ChordKind::Major7,
            "min7" | "m7" => ChordKind::Minor7,
            "dom7" | "7" => ChordKind::Dominant7,
            "sus2" => ChordKind::Sus2,
            "sus4" => ChordKind::Sus4,
            _ => return Err(Error::validation("chord", format!("unknown chord type {s:?}"))),
        })
    }
}

/// Close-voiced chord on `root` in `octave`, lowest tone first.
pub fn chord(root: &str, kind: ChordKind, octave: i32) -> Result<Vec<u8>, Error> {
    let root = note(root, octave)?;
    Ok(stack(root, kind.intervals()))
}

/// Opens up a voicing by raising every other tone (the 2nd, 4th, ...) an
/// octave. Tones that would leave the MIDI range stay where they are.
pub fn spread(chord: &[u8]) -> Vec<u8> {
    let mut voiced: Vec<u8> = chord
        .iter()
        .enumerate()
        .map(|(i, &pitch)| match i % 2 {
            1 if pitch <= 115 => pitch + 12,
            _ => pitch,
        })
        .collect();
    voiced.sort_unstable();
    voiced
}

fn stack(root: u8, intervals: &[u8]) -> Vec<u8> {
    intervals
        .iter()
        .filter_map(|i| root.checked_add(*i).filter(|p| *p <= 127))
        .collect()
}
