use rosc::OscType;
use serde::Serialize;

use crate::Error;

/// Values per note in a flattened note list.
pub const NOTE_FIELDS: usize = 5;

/// Which Live object an address targets. Fixes how many index values lead
/// both the request arguments and the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Song,
    Track,
    Scene,
    ClipSlot,
    Clip,
    Device,
    Parameter,
    /// A track's send, addressed as (track_index, send_index).
    Send,
    View,
    Application,
    Api,
}

impl Level {
    /// Names of the leading index arguments, in wire order.
    pub const fn index_names(self) -> &'static [&'static str] {
        match self {
            Level::Song | Level::View | Level::Application | Level::Api => &[],
            Level::Track => &["track_index"],
            Level::Scene => &["scene_index"],
            Level::ClipSlot => &["track_index", "scene_index"],
            Level::Clip => &["track_index", "clip_index"],
            Level::Device => &["track_index", "device_index"],
            Level::Parameter => &["track_index", "device_index", "parameter_index"],
            Level::Send => &["track_index", "send_index"],
        }
    }

    /// Number of index values echoed at the head of a reply.
    pub const fn prefix_len(self) -> usize {
        self.index_names().len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Reads a property; waits for the reply.
    Get,
    /// Writes a property; no reply.
    Set,
    /// Triggers something in Live; no reply.
    Action,
    /// Triggers something and waits for the reply carrying its result.
    Call,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgType {
    /// Non-negative integer that refers to a track, scene, ... by position.
    Index,
    Int,
    Float,
    /// Sent as int 0/1, which is what AbletonOSC reads.
    Bool,
    Str,
    /// A list of notes, flattened into five values per note.
    Notes,
}

/// Accepted values of a numeric argument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bounds {
    Any,
    /// Inclusive range.
    Between(f64, f64),
    /// Strictly greater than zero.
    Positive,
    /// A string with at least one non-blank character.
    NonEmpty,
}

impl Bounds {
    pub fn contains(self, value: f64) -> bool {
        match self {
            Bounds::Any => true,
            Bounds::Between(min, max) => value >= min && value <= max,
            Bounds::Positive => value > 0.0,
            Bounds::NonEmpty => true,
        }
    }

    fn is_any(&self) -> bool {
        matches!(self, Bounds::Any)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Param {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: ArgType,
    #[serde(skip_serializing_if = "Bounds::is_any")]
    pub bounds: Bounds,
}

impl Param {
    pub const fn new(name: &'static str, ty: ArgType) -> Self {
        Param {
            name,
            ty,
            bounds: Bounds::Any,
        }
    }

    pub const fn between(mut self, min: f64, max: f64) -> Self {
        self.bounds = Bounds::Between(min, max);
        self
    }

    pub const fn positive(mut self) -> Self {
        self.bounds = Bounds::Positive;
        self
    }

    pub const fn non_empty(mut self) -> Self {
        self.bounds = Bounds::NonEmpty;
        self
    }
}

/// Shape of the payload that follows the index prefix of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Nothing,
    Float,
    Int,
    Bool,
    Str,
    /// Every remaining value as a string.
    StrList,
    /// Two integers, e.g. (track_index, scene_index).
    IntPair,
    /// An index where a negative value means "not found".
    MaybeIndex,
    Notes,
}

/// One addressable AbletonOSC operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Operation {
    pub name: &'static str,
    pub address: &'static str,
    pub level: Level,
    pub kind: Kind,
    /// Arguments after the index prefix.
    pub params: &'static [Param],
    pub returns: Shape,
    pub summary: &'static str,
}

impl Operation {
    pub const fn get(
        name: &'static str,
        address: &'static str,
        level: Level,
        returns: Shape,
        summary: &'static str,
    ) -> Self {
        Operation {
            name,
            address,
            level,
            kind: Kind::Get,
            params: &[],
            returns,
            summary,
        }
    }

    pub const fn set(
        name: &'static str,
        address: &'static str,
        level: Level,
        params: &'static [Param],
        summary: &'static str,
    ) -> Self {
        Operation {
            name,
            address,
            level,
            kind: Kind::Set,
            params,
            returns: Shape::Nothing,
            summary,
        }
    }

    pub const fn action(
        name: &'static str,
        address: &'static str,
        level: Level,
        params: &'static [Param],
        summary: &'static str,
    ) -> Self {
        Operation {
            name,
            address,
            level,
            kind: Kind::Action,
            params,
            returns: Shape::Nothing,
            summary,
        }
    }

    pub const fn call(
        name: &'static str,
        address: &'static str,
        level: Level,
        params: &'static [Param],
        returns: Shape,
        summary: &'static str,
    ) -> Self {
        Operation {
            name,
            address,
            level,
            kind: Kind::Call,
            params,
            returns,
            summary,
        }
    }

    /// Whether the bridge answers this operation.
    pub const fn awaits_reply(&self) -> bool {
        matches!(self.kind, Kind::Get | Kind::Call)
    }

    pub const fn prefix_len(&self) -> usize {
        self.level.prefix_len()
    }

    /// Checks the arguments that follow the index prefix against
    /// [`Operation::params`]. Runs before anything is sent.
    pub fn check_args(&self, values: &[OscType]) -> Result<(), Error> {
        let variadic = matches!(self.params.last(), Some(p) if p.ty == ArgType::Notes);
        let fixed = self.params.len() - variadic as usize;
        let count_ok = if variadic {
            values.len() >= fixed && (values.len() - fixed) % NOTE_FIELDS == 0
        } else {
            values.len() == fixed
        };
        if !count_ok {
            return Err(Error::validation(
                self.name,
                format!("expected {} argument(s), got {}", self.params.len(), values.len()),
            ));
        }

        for (param, value) in self.params.iter().zip(values) {
            let number = match (param.ty, value) {
                (ArgType::Notes, _) => break,
                (ArgType::Index, OscType::Int(v)) if *v < 0 => {
                    return Err(Error::validation(param.name, format!("{v} is negative")));
                }
                (ArgType::Index | ArgType::Int, OscType::Int(v)) => *v as f64,
                (ArgType::Float, OscType::Float(v)) if !v.is_finite() => {
                    return Err(Error::validation(param.name, format!("{v} is not a finite number")));
                }
                (ArgType::Float, OscType::Float(v)) => *v as f64,
                (ArgType::Bool, OscType::Int(0 | 1)) => continue,
                (ArgType::Str, OscType::String(s)) if param.bounds == Bounds::NonEmpty && s.trim().is_empty() => {
                    return Err(Error::validation(param.name, "must not be empty"));
                }
                (ArgType::Str, OscType::String(_)) => continue,
                (ty, other) => {
                    return Err(Error::validation(param.name, format!("expected {ty:?}, got {other:?}")));
                }
            };
            if !param.bounds.contains(number) {
                let expected = match param.bounds {
                    Bounds::Between(min, max) => format!("{min}..={max}"),
                    _ => "a positive value".to_string(),
                };
                return Err(Error::validation(param.name, format!("{number} is outside {expected}")));
            }
        }
        Ok(())
    }
}
