use crate::beacon::Capability;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExitError>;

/// Why a user-supplied value could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputFormatError {
    #[error("path {0} does not match EIP-2334 format for a validator")]
    PathFormat(String),
    #[error("invalid {field} supplied: {reason}")]
    Hex { field: String, reason: String },
    #[error("invalid length for {field}: expected {expected} bytes, got {actual}")]
    FieldLength {
        field: String,
        expected: usize,
        actual: usize,
    },
    #[error("failed to parse {what}: {reason}")]
    Json { what: String, reason: String },
    #[error("invalid mnemonic: {0}")]
    Mnemonic(String),
    #[error("invalid validator identifier {0}")]
    ValidatorId(String),
    #[error("fuzziness must be between 0 and 100, got {0}")]
    Intensity(u8),
}

/// Reason an untrusted signed exit was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("unknown validator {0}")]
    UnknownValidator(u64),
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

#[derive(Debug, Error)]
pub enum ExitError {
    #[error("failed to connect to beacon node: {0}")]
    ConnectionFailure(String),
    #[error("beacon node returned {status}: {message}")]
    NodeResponse { status: u16, message: String },
    #[error("beacon node does not provide {0}")]
    UnsupportedCapability(Capability),
    #[error(transparent)]
    InvalidInputFormat(#[from] InputFormatError),
    #[error("{0}")]
    AmbiguousInputCombination(String),
    #[error("validator not found: {0}")]
    UnknownValidator(String),
    #[error("failed to derive key: {0}")]
    KeyDerivationFailure(String),
    #[error("failed to sign exit operation: {0}")]
    SigningFailure(String),
    #[error("operation failed validation: {0}")]
    OperationFailedValidation(RejectionReason),
    #[error("exit operation rejected by beacon node: {0}")]
    SubmissionRejected(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExitError {
    pub(crate) fn hex(field: &str, err: hex::FromHexError) -> Self {
        InputFormatError::Hex {
            field: field.to_string(),
            reason: err.to_string(),
        }
        .into()
    }

    pub(crate) fn length(field: &str, expected: usize, actual: usize) -> Self {
        InputFormatError::FieldLength {
            field: field.to_string(),
            expected,
            actual,
        }
        .into()
    }

    pub(crate) fn json(what: &str, err: serde_json::Error) -> Self {
        InputFormatError::Json {
            what: what.to_string(),
            reason: err.to_string(),
        }
        .into()
    }
}

impl From<reqwest::Error> for ExitError {
    fn from(err: reqwest::Error) -> Self {
        ExitError::ConnectionFailure(err.to_string())
    }
}
