//! Application layer: the four command flows over injectable seams.

pub mod commands;

pub use commands::{
    ControlConnection, ControlEndpoint, ControlError, FlowError, PulseOptions, TvCommands,
    WolError, WolSender,
};
