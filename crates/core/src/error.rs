use sencare_types::TextError;

/// Broad category of a [`PatientError`].
///
/// Callers use this to decide how to notify the user: validation problems are correctable
/// in the form, transport problems mean the store could not be reached, and rejections mean
/// the store answered but refused the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    Rejected,
    Configuration,
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid input: {0}")]
    Text(#[from] TextError),

    #[error("request failed: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("not found: {0}")]
    NotFound(String),
    #[error("store rejected request (status {status:?}): {message}")]
    Rejected { status: String, message: String },

    #[error("failed to read risk configuration: {0}")]
    ConfigRead(std::io::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("invalid risk configuration: {0}")]
    InvalidConfig(String),
}

impl PatientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PatientError::InvalidInput(_) | PatientError::Text(_) => ErrorKind::Validation,
            PatientError::Transport(_) | PatientError::MalformedResponse(_) => {
                ErrorKind::Transport
            }
            PatientError::NotFound(_) | PatientError::Rejected { .. } => ErrorKind::Rejected,
            PatientError::ConfigRead(_)
            | PatientError::YamlDeserialization(_)
            | PatientError::InvalidConfig(_) => ErrorKind::Configuration,
        }
    }
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;
