use scopecore::decoder::DecoderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("unknown protocol '{0}'")]
    UnknownProtocol(String),

    #[error("input slot {slot} does not exist; decoder has {count} inputs")]
    SlotOutOfRange { slot: usize, count: usize },

    #[error("channel '{channel}' is not a valid source for input '{input}'")]
    IncompatibleChannel { input: String, channel: String },

    #[error("decoder has no parameter '{0}'")]
    UnknownParameter(String),

    #[error("value {value} for parameter '{name}' is outside the range {min} to {max}")]
    ParameterOutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("no channel named '{0}' in capture")]
    UnknownChannel(String),

    #[error("sample {index} of channel '{channel}' does not match its declared kind and width")]
    SampleTypeMismatch { channel: String, index: usize },

    #[error("samples of channel '{0}' are out of order or overlap")]
    MalformedCapture(String),

    #[error("unable to read capture file: {0}")]
    Io(#[from] std::io::Error),

    #[error("capture file is not valid: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScopeError {
    pub(crate) fn from_decoder(name: &str, e: DecoderError) -> Self {
        match e {
            DecoderError::UnknownParameter => Self::UnknownParameter(name.to_owned()),
            DecoderError::ParameterOutOfRange { value, min, max } => Self::ParameterOutOfRange {
                name: name.to_owned(),
                value,
                min,
                max,
            },
        }
    }
}
