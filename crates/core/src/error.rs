#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to create record directory: {0}")]
    RecordDirCreation(std::io::Error),
    #[error("failed to remove record directory: {0}")]
    RecordDirRemoval(std::io::Error),
    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize record: {0}")]
    Deserialization(serde_json::Error),

    #[error("record not found")]
    NotFound,
    #[error("an account with this email already exists")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("failed to hash password: {0}")]
    PasswordHash(String),
}

pub type BookingResult<T> = std::result::Result<T, BookingError>;
