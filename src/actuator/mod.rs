// Actuator module - turns trial decisions into output codes
//
// ActuatorMap (decision -> code) -> ActuationSink (settling delay) ->
// ActuatorChannel (one byte to the device)

pub mod channel;
pub mod mapper;
pub mod sink;

pub use channel::{
    open_channel, open_device, open_serial, ActuatorChannel, ChannelKind, DeviceChannel,
    MemoryChannel, Parity, SerialChannel, SerialSettings, WriterChannel,
};
pub use mapper::ActuatorMap;
pub use sink::{
    ActuationReceipt, ActuationSink, BlockingActuator, ScheduledActuation, ScheduledActuator,
    DEFAULT_SETTLING_DELAY,
};

use crate::error::ActuatorError;

/// What happened to a trial's actuation
#[derive(Debug, Clone, PartialEq)]
pub enum ActuationStatus {
    /// Decision was neutral/empty or its class has no code
    NotRequired,
    /// A code was due but no channel is attached to the session
    NoChannel { code: u8 },
    /// The sink accepted the code
    Dispatched(ActuationReceipt),
    /// The sink reported an error; the trial is still recorded
    Failed(ActuatorError),
}
