use thiserror::Error;

pub type Result<T> = ::std::result::Result<T, FormatError>;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Serialization Error: {0}")]
    Serialization(#[from] Box<bincode::ErrorKind>),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported mesh format version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}
