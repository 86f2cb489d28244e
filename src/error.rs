use rootcause::Report;
use thiserror::Error;

/// Which buffer a draw call referenced when its descriptor could not be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferRole {
    Index,
    Position,
}

impl std::fmt::Display for BufferRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferRole::Index => f.write_str("index"),
            BufferRole::Position => f.write_str("position"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("no indexed triangle draw call with vertex attributes found in trace")]
    NoEligibleDrawCall,
    #[error("no vertex attribute looks like a position (3 x f32 or 3 x unnormalized u16)")]
    MissingPositionAttribute,
    #[error("{role} buffer descriptor {id:?} not found in trace")]
    MissingBufferDescriptor { role: BufferRole, id: Option<u32> },
    #[error("unsupported component type {0:#06x}")]
    UnsupportedComponentType(u32),
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("serialization error: {0}")]
    Serialize(String),
    #[error("I/O error: {0}")]
    Io(String),
}

pub type TranscodeResult<T> = Result<T, Report<TranscodeError>>;

pub(crate) fn malformed(detail: impl Into<String>) -> Report<TranscodeError> {
    Report::new(TranscodeError::MalformedInput(detail.into()))
}
