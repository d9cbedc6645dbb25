//! JSON tool surface over the operation catalog.
//!
//! Every catalog [`Operation`] is a tool named after it. Arguments are a JSON
//! object holding the operation's index values (`track_index`, ...) and its
//! parameters; results are JSON objects. No MCP transport lives here: an MCP
//! server hands `tools/list` to [`ToolSurface::tools`] and `tools/call` to
//! [`ToolSurface::invoke`] or [`ToolSurface::handle_tool_call`].

use rosc::OscType;
use serde_json::{json, Map, Value};

use crate::{
    live::{self, clip::Note},
    payload::{self, boolean, float, int, string},
    AbletonOSC, ArgType, Bounds, Error, Level, Operation, Param, Shape,
};

/// Tools that run more than one OSC request.
const GET_PARAMETERS: &str = "device_get_parameters";

pub struct ToolSurface<'a> {
    client: &'a AbletonOSC,
}

impl<'a> ToolSurface<'a> {
    pub fn new(client: &'a AbletonOSC) -> Self {
        ToolSurface { client }
    }

    /// Tool descriptors in MCP `tools/list` form.
    pub fn tools() -> Value {
        let mut tools: Vec<Value> = live::catalog().map(descriptor).collect();
        tools.push(json!({
            "name": GET_PARAMETERS,
            "description": "Name, value, min and max of every parameter of a device.",
            "inputSchema": input_schema(Level::Device, &[]),
        }));
        json!({ "tools": tools })
    }

    /// Runs `name` with the JSON object `args`.
    ///
    /// Arguments are checked before anything is sent: a missing, mistyped
    /// or out-of-range argument is an [`Error::Validation`].
    pub async fn invoke(&self, name: &str, args: &Value) -> Result<Value, Error> {
        let args = arguments(args)?;
        if name == GET_PARAMETERS {
            let indices = indices(Level::Device, args)?;
            reject_unknown(Level::Device, &[], args)?;
            let parameters = self.client.device().get_parameters(indices[0], indices[1]).await?;
            return Ok(json!({ "parameters": parameters }));
        }

        let op = live::find(name).ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        let indices = indices(op.level, args)?;
        reject_unknown(op.level, op.params, args)?;
        let values = op
            .params
            .iter()
            .map(|param| value(param, args))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect();

        log::debug!("Tool {} {:?}", name, args);
        let reply = self.client.execute(op, &indices, values).await?;
        render(op, &reply)
    }

    /// Like [`ToolSurface::invoke`], but reports failures as
    /// `{"status": "error", "message": ...}` for handing straight back to
    /// the caller of the tool.
    pub async fn handle_tool_call(&self, name: &str, args: &Value) -> Value {
        match self.invoke(name, args).await {
            Ok(result) => result,
            Err(err) => {
                log::warn!("Tool {} failed: {}", name, err);
                json!({ "status": "error", "kind": error_kind(&err), "message": err.to_string() })
            }
        }
    }
}

fn error_kind(err: &Error) -> &'static str {
    match err {
        Error::Timeout { .. } => "timeout",
        Error::Validation { .. } => "validation",
        Error::UnknownTool(_) => "unknown_tool",
        Error::Protocol(_) | Error::UnexpectedReply { .. } => "protocol",
        _ => "internal",
    }
}

fn descriptor(op: &Operation) -> Value {
    json!({
        "name": op.name,
        "description": op.summary,
        "inputSchema": input_schema(op.level, op.params),
        "annotations": {
            "address": op.address,
            "kind": op.kind,
            "level": op.level,
        },
    })
}

fn input_schema(level: Level, params: &[Param]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for name in level.index_names() {
        properties.insert(name.to_string(), json!({ "type": "integer", "minimum": 0 }));
        required.push(*name);
    }
    for param in params {
        properties.insert(param.name.to_string(), param_schema(param));
        required.push(param.name);
    }
    json!({ "type": "object", "properties": properties, "required": required })
}

fn param_schema(param: &Param) -> Value {
    let mut schema = match param.ty {
        ArgType::Index => json!({ "type": "integer", "minimum": 0 }),
        ArgType::Int => json!({ "type": "integer" }),
        ArgType::Float => json!({ "type": "number" }),
        ArgType::Bool => json!({ "type": "boolean" }),
        ArgType::Str => json!({ "type": "string" }),
        ArgType::Notes => json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "pitch": { "type": "integer", "minimum": 0, "maximum": 127 },
                    "start_time": { "type": "number", "minimum": 0 },
                    "duration": { "type": "number", "exclusiveMinimum": 0 },
                    "velocity": { "type": "integer", "minimum": 0, "maximum": 127 },
                    "mute": { "type": "boolean" },
                },
                "required": ["pitch", "start_time", "duration", "velocity"],
            },
        }),
    };
    match param.bounds {
        Bounds::Between(min, max) => {
            schema["minimum"] = json!(min);
            if max < f64::MAX {
                schema["maximum"] = json!(max);
            }
        }
        Bounds::Positive => schema["exclusiveMinimum"] = json!(0),
        Bounds::NonEmpty => schema["minLength"] = json!(1),
        Bounds::Any => {}
    }
    schema
}

fn arguments(args: &Value) -> Result<&Map<String, Value>, Error> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    match args {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(EMPTY.get_or_init(Map::new)),
        other => Err(Error::validation("arguments", format!("expected an object, got {other}"))),
    }
}

fn indices(level: Level, args: &Map<String, Value>) -> Result<Vec<u32>, Error> {
    level
        .index_names()
        .iter()
        .map(|name| index(name, required(name, args)?))
        .collect()
}

fn reject_unknown(level: Level, params: &[Param], args: &Map<String, Value>) -> Result<(), Error> {
    let known = |key: &str| level.index_names().contains(&key) || params.iter().any(|p| p.name == key);
    match args.keys().find(|key| !known(key)) {
        Some(key) => Err(Error::validation(key.as_str(), "unknown argument")),
        None => Ok(()),
    }
}

fn required<'v>(name: &str, args: &'v Map<String, Value>) -> Result<&'v Value, Error> {
    args.get(name)
        .filter(|v| !v.is_null())
        .ok_or_else(|| Error::validation(name, "missing"))
}

fn index(name: &str, value: &Value) -> Result<u32, Error> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| Error::validation(name, format!("expected a non-negative integer, got {value}")))
}

/// Converts one JSON argument to the OSC values it occupies.
fn value(param: &Param, args: &Map<String, Value>) -> Result<Vec<OscType>, Error> {
    let name = param.name;
    let raw = required(name, args)?;
    let mismatch = |expected: &str| Error::validation(name, format!("expected {expected}, got {raw}"));
    let single = match param.ty {
        ArgType::Index => int(payload::index(name, index(name, raw)?)?),
        ArgType::Int => int(raw
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| mismatch("an integer"))?),
        ArgType::Float => float(raw.as_f64().ok_or_else(|| mismatch("a number"))? as f32),
        ArgType::Bool => boolean(match raw {
            Value::Bool(v) => *v,
            Value::Number(n) if n.as_u64() == Some(0) => false,
            Value::Number(n) if n.as_u64() == Some(1) => true,
            _ => return Err(mismatch("a boolean")),
        }),
        ArgType::Str => string(raw.as_str().ok_or_else(|| mismatch("a string"))?),
        ArgType::Notes => {
            let notes: Vec<Note> = serde_json::from_value(raw.clone())
                .map_err(|err| Error::validation(name, err.to_string()))?;
            return Note::encode_all(&notes);
        }
    };
    Ok(vec![single])
}

fn render(op: &Operation, reply: &[OscType]) -> Result<Value, Error> {
    let address = op.address;
    Ok(match op.returns {
        Shape::Nothing => json!({ "status": "ok" }),
        Shape::Float => json!({ "value": payload::scalar::<f32>(address, reply)? }),
        Shape::Int => json!({ "value": payload::scalar::<i32>(address, reply)? }),
        Shape::Bool => json!({ "value": payload::scalar::<bool>(address, reply)? }),
        Shape::Str => json!({ "value": payload::scalar::<String>(address, reply)? }),
        Shape::StrList => json!({ "values": payload::list::<String>(address, reply)? }),
        Shape::IntPair => json!({
            "values": [
                payload::value_at::<i32>(address, reply, 0)?,
                payload::value_at::<i32>(address, reply, 1)?,
            ]
        }),
        Shape::MaybeIndex => {
            let index: i32 = payload::scalar(address, reply)?;
            json!({ "value": u32::try_from(index).ok() })
        }
        Shape::Notes => json!({ "notes": Note::decode_all(address, reply)? }),
    })
}

/// Names of every tool [`ToolSurface::invoke`] accepts.
pub fn tool_names() -> impl Iterator<Item = &'static str> {
    live::catalog()
        .map(|op| op.name)
        .chain(std::iter::once(GET_PARAMETERS))
}
