//! Conversions between Rust values and OSC arguments.

use rosc::OscType;

use crate::Error;

/// A value that can be read from a single OSC argument.
pub trait FromOsc: Sized {
    const EXPECTED: &'static str;

    fn from_osc(arg: &OscType) -> Option<Self>;
}

impl FromOsc for f32 {
    const EXPECTED: &'static str = "a float";

    fn from_osc(arg: &OscType) -> Option<Self> {
        match *arg {
            OscType::Float(v) => Some(v),
            OscType::Double(v) => Some(v as f32),
            OscType::Int(v) => Some(v as f32),
            OscType::Long(v) => Some(v as f32),
            _ => None,
        }
    }
}

impl FromOsc for i32 {
    const EXPECTED: &'static str = "an integer";

    fn from_osc(arg: &OscType) -> Option<Self> {
        match *arg {
            OscType::Int(v) => Some(v),
            OscType::Long(v) => i32::try_from(v).ok(),
            OscType::Bool(v) => Some(v as i32),
            // Some Live properties are floats that only ever hold whole numbers.
            OscType::Float(v) if v.fract() == 0.0 => Some(v as i32),
            _ => None,
        }
    }
}

impl FromOsc for u32 {
    const EXPECTED: &'static str = "a non-negative integer";

    fn from_osc(arg: &OscType) -> Option<Self> {
        i32::from_osc(arg).and_then(|v| u32::try_from(v).ok())
    }
}

impl FromOsc for bool {
    const EXPECTED: &'static str = "a boolean";

    fn from_osc(arg: &OscType) -> Option<Self> {
        match *arg {
            OscType::Bool(v) => Some(v),
            OscType::Int(v) => Some(v != 0),
            OscType::Float(v) => Some(v != 0.0),
            _ => None,
        }
    }
}

impl FromOsc for String {
    const EXPECTED: &'static str = "a string";

    fn from_osc(arg: &OscType) -> Option<Self> {
        match arg {
            OscType::String(s) => Some(s.clone()),
            OscType::Nil => Some(String::new()),
            _ => None,
        }
    }
}

/// Reads the value at `position` of a reply payload.
pub fn value_at<T: FromOsc>(address: &str, payload: &[OscType], position: usize) -> Result<T, Error> {
    let arg = payload
        .get(position)
        .ok_or_else(|| Error::unexpected(address, format!("missing value at position {position}")))?;
    T::from_osc(arg).ok_or_else(|| {
        Error::unexpected(address, format!("expected {} at position {position}, got {arg:?}", T::EXPECTED))
    })
}

/// Reads the first value of a reply payload.
pub fn scalar<T: FromOsc>(address: &str, payload: &[OscType]) -> Result<T, Error> {
    value_at(address, payload, 0)
}

/// Reads every value of a reply payload.
pub fn list<T: FromOsc>(address: &str, payload: &[OscType]) -> Result<Vec<T>, Error> {
    (0..payload.len()).map(|i| value_at(address, payload, i)).collect()
}

pub fn int(value: i32) -> OscType {
    OscType::Int(value)
}

pub fn float(value: f32) -> OscType {
    OscType::Float(value)
}

pub fn boolean(value: bool) -> OscType {
    OscType::Int(value as i32)
}

pub fn string(value: impl Into<String>) -> OscType {
    OscType::String(value.into())
}

/// Converts a position to the int32 the wire carries.
pub fn index(name: &str, value: u32) -> Result<i32, Error> {
    i32::try_from(value).map_err(|_| Error::validation(name, format!("{value} does not fit in an OSC int32")))
}

pub fn finite(name: &str, value: f32) -> Result<f32, Error> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::validation(name, format!("{value} is not a finite number")))
    }
}

/// Checks `min <= value <= max` for floats (finite) and integers alike.
pub fn in_range<T>(name: &str, value: T, min: T, max: T) -> Result<T, Error>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value >= min && value <= max {
        Ok(value)
    } else {
        Err(Error::validation(name, format!("{value} is outside {min}..={max}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bools_arrive_in_several_encodings() {
        assert_eq!(bool::from_osc(&OscType::Bool(true)), Some(true));
        assert_eq!(bool::from_osc(&OscType::Int(0)), Some(false));
        assert_eq!(bool::from_osc(&OscType::Float(1.0)), Some(true));
        assert_eq!(bool::from_osc(&OscType::String("yes".into())), None);
    }

    #[test]
    fn whole_floats_read_as_ints() {
        assert_eq!(i32::from_osc(&OscType::Float(4.0)), Some(4));
        assert_eq!(i32::from_osc(&OscType::Float(4.5)), None);
        assert_eq!(u32::from_osc(&OscType::Int(-1)), None);
    }

    #[test]
    fn shape_errors_name_the_position() {
        let payload = [OscType::String("Bass".into())];
        let err = scalar::<f32>("/live/track/get/volume", &payload).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected reply on /live/track/get/volume: expected a float at position 0, got String(\"Bass\")"
        );
        let err = value_at::<f32>("/live/track/get/volume", &payload, 3).unwrap_err();
        assert!(matches!(err, Error::UnexpectedReply { .. }));
    }

    #[test]
    fn range_checks() {
        assert_eq!(in_range("volume", 0.5_f32, 0.0, 1.0).unwrap(), 0.5);
        assert!(in_range("pitch", 128, 0, 127).is_err());
        assert!(in_range("volume", f32::NAN, 0.0, 1.0).is_err());
        assert!(finite("tempo", f32::INFINITY).is_err());
        assert!(index("track_index", u32::MAX).is_err());
        assert_eq!(index("track_index", 7).unwrap(), 7);
    }
}
