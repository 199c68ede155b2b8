//! Remote command/event protocol driving a form over an injected transport.

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod protocol;

pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder, EngineHost};
pub use error::{CommandError, CommandResult, ProtocolError, ProtocolResult};
pub use event::{ControlValue, Event, EventBody};
pub use protocol::{Command, decode_batch, decode_command};
