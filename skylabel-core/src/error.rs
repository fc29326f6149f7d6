use thiserror::Error;

pub type Result<T> = std::result::Result<T, LabelError>;

/// Everything that can stop a sheet from being built.
#[derive(Error, Debug)]
pub enum LabelError {
    #[error("unknown template `{name}` (choose from: {})", .choices.join(", "))]
    UnknownTemplate { name: String, choices: Vec<String> },

    #[error("template `{name}` is invalid: {reason}")]
    InvalidTemplate { name: String, reason: String },

    /// A record whose field count does not match the template.
    #[error("line {line}: expected {expected} fields, found {found}")]
    Arity {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: seal fragment references @FIELD{index}@ but the record has {found} fields")]
    SealField {
        line: u64,
        index: usize,
        found: usize,
    },

    #[error("cannot encode QR payload `{payload}`: {reason}")]
    Qr { payload: String, reason: String },

    #[error("malformed input: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid template catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
