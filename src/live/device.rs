//! `/live/device/*`: devices on a track's chain and their parameters.

use futures::future::try_join_all;
use serde::Serialize;

use crate::{
    payload::{boolean, float},
    AbletonOSC, ArgType, Error, Level, Operation, Param, Shape,
};

const L: Level = Level::Device;
const P: Level = Level::Parameter;

/// A snapshot of one device parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub index: u32,
    pub name: String,
    pub value: f32,
    pub min: f32,
    pub max: f32,
}

pub const GET_NAME: Operation = Operation::get("device_get_name", "/live/device/get/name", L, Shape::Str, "Device name as shown in the chain.");
pub const GET_CLASS_NAME: Operation = Operation::get("device_get_class_name", "/live/device/get/class_name", L, Shape::Str, "Live's class name for the device, e.g. InstrumentVector.");
pub const GET_IS_ACTIVE: Operation = Operation::get("device_get_is_active", "/live/device/get/is_active", L, Shape::Bool, "Whether the device is switched on.");
pub const SET_IS_ACTIVE: Operation = Operation::set(
    "device_set_is_active",
    "/live/device/set/is_active",
    L,
    &[Param::new("active", ArgType::Bool)],
    "Switch a device on or off.",
);
pub const GET_NUM_PARAMETERS: Operation = Operation::get("device_get_num_parameters", "/live/device/get/num_parameters", L, Shape::Int, "Number of parameters the device exposes.");

pub const GET_PARAMETER_VALUE: Operation = Operation::get("device_get_parameter_value", "/live/device/get/parameter/value", P, Shape::Float, "Current value of a parameter.");
pub const SET_PARAMETER_VALUE: Operation = Operation::set(
    "device_set_parameter_value",
    "/live/device/set/parameter/value",
    P,
    &[Param::new("value", ArgType::Float)],
    "Set a parameter value, within the parameter's min and max.",
);
pub const GET_PARAMETER_NAME: Operation = Operation::get("device_get_parameter_name", "/live/device/get/parameter/name", P, Shape::Str, "Name of a parameter.");
pub const GET_PARAMETER_MIN: Operation = Operation::get("device_get_parameter_min", "/live/device/get/parameter/min", P, Shape::Float, "Lowest value of a parameter.");
pub const GET_PARAMETER_MAX: Operation = Operation::get("device_get_parameter_max", "/live/device/get/parameter/max", P, Shape::Float, "Highest value of a parameter.");

pub const OPERATIONS: &[Operation] = &[
    GET_NAME,
    GET_CLASS_NAME,
    GET_IS_ACTIVE,
    SET_IS_ACTIVE,
    GET_NUM_PARAMETERS,
    GET_PARAMETER_VALUE,
    SET_PARAMETER_VALUE,
    GET_PARAMETER_NAME,
    GET_PARAMETER_MIN,
    GET_PARAMETER_MAX,
];

#[derive(Clone, Copy)]
pub struct Device<'a> {
    client: &'a AbletonOSC,
}

impl<'a> Device<'a> {
    pub(crate) fn new(client: &'a AbletonOSC) -> Self {
        Device { client }
    }

    pub async fn get_name(self, track_index: u32, device_index: u32) -> Result<String, Error> {
        self.client.get(&GET_NAME, &[track_index, device_index]).await
    }

    pub async fn get_class_name(self, track_index: u32, device_index: u32) -> Result<String, Error> {
        self.client.get(&GET_CLASS_NAME, &[track_index, device_index]).await
    }

    pub async fn get_is_active(self, track_index: u32, device_index: u32) -> Result<bool, Error> {
        self.client.get(&GET_IS_ACTIVE, &[track_index, device_index]).await
    }

    pub async fn set_is_active(self, track_index: u32, device_index: u32, active: bool) -> Result<(), Error> {
        self.client
            .put(&SET_IS_ACTIVE, &[track_index, device_index], vec![boolean(active)])
            .await
    }

    pub async fn get_num_parameters(self, track_index: u32, device_index: u32) -> Result<u32, Error> {
        self.client.get(&GET_NUM_PARAMETERS, &[track_index, device_index]).await
    }

    pub async fn get_parameter_value(self, track_index: u32, device_index: u32, parameter_index: u32) -> Result<f32, Error> {
        self.client
            .get(&GET_PARAMETER_VALUE, &[track_index, device_index, parameter_index])
            .await
    }

    pub async fn set_parameter_value(
        self,
        track_index: u32,
        device_index: u32,
        parameter_index: u32,
        value: f32,
    ) -> Result<(), Error> {
        self.client
            .put(&SET_PARAMETER_VALUE, &[track_index, device_index, parameter_index], vec![float(value)])
            .await
    }

    pub async fn get_parameter_name(self, track_index: u32, device_index: u32, parameter_index: u32) -> Result<String, Error> {
        self.client
            .get(&GET_PARAMETER_NAME, &[track_index, device_index, parameter_index])
            .await
    }

    pub async fn get_parameter_min(self, track_index: u32, device_index: u32, parameter_index: u32) -> Result<f32, Error> {
        self.client
            .get(&GET_PARAMETER_MIN, &[track_index, device_index, parameter_index])
            .await
    }

    pub async fn get_parameter_max(self, track_index: u32, device_index: u32, parameter_index: u32) -> Result<f32, Error> {
        self.client
            .get(&GET_PARAMETER_MAX, &[track_index, device_index, parameter_index])
            .await
    }

    /// Reads name, value and range of every parameter of a device.
    ///
    /// Parameters are queried concurrently; each query has its own index
    /// prefix so the replies cannot be confused.
    pub async fn get_parameters(self, track_index: u32, device_index: u32) -> Result<Vec<Parameter>, Error> {
        let count = self.get_num_parameters(track_index, device_index).await?;
        log::debug!(
            "Reading {} parameters of device {} on track {}",
            count,
            device_index,
            track_index
        );
        try_join_all((0..count).map(|index| self.get_parameter(track_index, device_index, index))).await
    }

    async fn get_parameter(self, track_index: u32, device_index: u32, index: u32) -> Result<Parameter, Error> {
        let (name, value, min, max) = futures::try_join!(
            self.get_parameter_name(track_index, device_index, index),
            self.get_parameter_value(track_index, device_index, index),
            self.get_parameter_min(track_index, device_index, index),
            self.get_parameter_max(track_index, device_index, index),
        )?;
        Ok(Parameter {
            index,
            name,
            value,
            min,
            max,
        })
    }

    /// Sets a parameter after checking `value` against the range the
    /// device reports for it.
    pub async fn set_parameter_checked(
        self,
        track_index: u32,
        device_index: u32,
        parameter_index: u32,
        value: f32,
    ) -> Result<(), Error> {
        let (min, max) = futures::try_join!(
            self.get_parameter_min(track_index, device_index, parameter_index),
            self.get_parameter_max(track_index, device_index, parameter_index),
        )?;
        crate::payload::in_range("value", value, min, max)?;
        self.set_parameter_value(track_index, device_index, parameter_index, value)
            .await
    }
}
