//! `/live/application/*` and the bridge liveness check.

use crate::{payload, AbletonOSC, Error, Level, Operation, Shape};

pub const GET_VERSION: Operation = Operation::get(
    "application_get_version",
    "/live/application/get/version",
    Level::Application,
    Shape::IntPair,
    "Live's version as [major, minor].",
);
pub const TEST: Operation = Operation::call(
    "application_test",
    "/live/test",
    Level::Application,
    &[],
    Shape::Str,
    "Check that AbletonOSC is loaded and answering.",
);

pub const OPERATIONS: &[Operation] = &[GET_VERSION, TEST];

#[derive(Clone, Copy)]
pub struct Application<'a> {
    client: &'a AbletonOSC,
}

impl<'a> Application<'a> {
    pub(crate) fn new(client: &'a AbletonOSC) -> Self {
        Application { client }
    }

    /// Returns `(major, minor)`, e.g. `(12, 1)`.
    pub async fn get_version(self) -> Result<(i32, i32), Error> {
        let reply = self.client.execute(&GET_VERSION, &[], Vec::new()).await?;
        Ok((
            payload::value_at(GET_VERSION.address, &reply, 0)?,
            payload::value_at(GET_VERSION.address, &reply, 1)?,
        ))
    }

    /// Whether the bridge answered within the configured timeout.
    ///
    /// Errors other than a timeout are returned as-is.
    pub async fn test(self) -> Result<bool, Error> {
        match self.client.execute(&TEST, &[], Vec::new()).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_timeout() => {
                log::warn!("AbletonOSC did not answer: {}", err);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}
