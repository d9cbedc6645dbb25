//! `/live/api/*`: control of the AbletonOSC script itself.

use crate::{Level, Operation};

pub const RELOAD: Operation = Operation::action(
    "api_reload",
    "/live/api/reload",
    Level::Api,
    &[],
    "Reload AbletonOSC's handlers. Nothing is sent back.",
);

pub const OPERATIONS: &[Operation] = &[RELOAD];
