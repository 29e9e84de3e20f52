use thiserror::Error;

/// Failures inside the audio backends. They are logged where they occur and
/// degrade to silence; none of them reaches callers of the trigger contract.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoDevice,

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to build audio node `{node}`: {reason}")]
    Graph { node: &'static str, reason: String },

    #[error("failed to build output stream: {0}")]
    Build(String),

    #[error("audio stream error: {0}")]
    Stream(String),
}

pub type AudioResult<T> = Result<T, AudioError>;
