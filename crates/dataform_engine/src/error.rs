use dataform_forms::FormError;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed command batch: {0}")]
    Batch(#[source] serde_json::Error),

    #[error("command batch is not an array")]
    NotArray,

    #[error("malformed command: {0}")]
    Command(#[source] serde_json::Error),

    #[error("command {kind:#x} is missing `{field}`")]
    MissingField { kind: u32, field: &'static str },

    #[error("unknown command kind {0}")]
    UnknownKind(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Failure while applying one decoded command. Never leaves the engine:
/// it is logged and the rest of the batch carries on.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("no form is drawn")]
    NoForm,

    #[error("control `{0}` not found")]
    ControlNotFound(String),

    #[error("button `{0}` not found")]
    ButtonNotFound(String),

    #[error("control `{name}` is not a {expected}")]
    WrongKind { name: String, expected: &'static str },

    #[error("index {index} out of range for `{name}`")]
    IndexOutOfRange { name: String, index: i64 },

    #[error(transparent)]
    Structure(#[from] FormError),
}

pub type CommandResult<T> = Result<T, CommandError>;
