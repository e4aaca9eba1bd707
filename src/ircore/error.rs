use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IrError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    #[error("malformed {file} line {line}: {reason}")]
    Malformed {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("dictionary table is full ({0} slots)")]
    TableFull(u64),

    #[error("term '{0}' contains whitespace")]
    InvalidTerm(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("invalid wildcard pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("{0} is not configured")]
    Unavailable(&'static str),
}

pub type Result<T> = std::result::Result<T, IrError>;

impl IrError {
    pub fn malformed(file: &str, line: usize, reason: impl Into<String>) -> Self {
        IrError::Malformed {
            file: file.to_string(),
            line,
            reason: reason.into(),
        }
    }
}
