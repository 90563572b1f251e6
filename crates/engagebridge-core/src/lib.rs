//! engagebridge-core - Core types shared by every bridge component
//!
//! This crate provides the foundational types for the engagement SDK bridge:
//! - [`MethodCall`] and [`MethodResult`] crossing the channel boundary
//! - [`BridgeError`] for error handling and error-code mapping
//! - [`SdkConfig`] decoded from the `initialize` call
//! - [`ModuleState`] and [`InlinePhase`] state machines

mod config;
mod error;
mod lifecycle;
mod request;

pub use config::{
    Arguments, ArgumentsExt, InAppConfig, PushClickBehavior, PushConfig, Region, ScreenViewUse,
    SdkClientInfo, SdkConfig, SdkLogLevel,
};
pub use error::{BridgeError, BridgeResult, FETCH_ERROR, INBOX_NOT_AVAILABLE, INVALID_ARGUMENTS};
pub use lifecycle::{InlinePhase, ModuleState};
pub use request::{MethodCall, MethodError, MethodResult};

/// Log levels for the host log sink
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Off = 5,
}

impl LogLevel {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Off,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Arguments, ArgumentsExt, BridgeError, BridgeResult, InlinePhase, LogLevel, MethodCall,
        MethodError, MethodResult, ModuleState, SdkConfig,
    };
}
