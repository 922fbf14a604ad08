use thiserror::Error;

/// flatdb Error type
#[derive(Debug, Error)]
pub enum FlatDbError {
    /// The table lock could not be acquired within the retry budget. `attempts` counts the lock file attempts made, and is `0` when
    /// the budget was spent waiting for another thread of this process.
    #[error("Timed out acquiring lock for table '{table}' ({attempts} lock file attempts)")]
    LockTimeout { table: String, attempts: u32 },
    /// The lock file could not be opened or locked for a reason other than contention.
    #[error("Failed to lock table '{table}': {source}")]
    LockFailed {
        table: String,
        source: std::io::Error,
    },
    /// The table file is not valid JSON of the expected shape.
    #[error("Corrupt data in table '{table}': {reason}")]
    CorruptData { table: String, reason: String },
    #[error("Failed to read table '{table}': {source}")]
    ReadFailed {
        table: String,
        source: std::io::Error,
    },
    /// Serializing or persisting the table failed. The previous file is left intact.
    #[error("Failed to write table '{table}': {source}")]
    WriteFailed {
        table: String,
        source: std::io::Error,
    },
    #[error("Unknown table: {0}")]
    UnknownTable(String),
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Sanitize error: {0}")]
    Sanitize(String),
}

/// Distinguishable kind of a [`FlatDbError`], for callers translating errors into responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    LockTimeout,
    LockFailed,
    CorruptData,
    ReadFailed,
    WriteFailed,
    UnknownTable,
    InvalidRecord,
    Config,
    Validation,
    Sanitize,
}

impl FlatDbError {
    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlatDbError::LockTimeout { .. } => ErrorKind::LockTimeout,
            FlatDbError::LockFailed { .. } => ErrorKind::LockFailed,
            FlatDbError::CorruptData { .. } => ErrorKind::CorruptData,
            FlatDbError::ReadFailed { .. } => ErrorKind::ReadFailed,
            FlatDbError::WriteFailed { .. } => ErrorKind::WriteFailed,
            FlatDbError::UnknownTable(_) => ErrorKind::UnknownTable,
            FlatDbError::InvalidRecord(_) => ErrorKind::InvalidRecord,
            FlatDbError::Config(_) => ErrorKind::Config,
            FlatDbError::Validation(_) => ErrorKind::Validation,
            FlatDbError::Sanitize(_) => ErrorKind::Sanitize,
        }
    }

    /// Whether retrying the same call later may succeed.
    ///
    /// Only lock contention is transient; every other failure needs intervention.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::LockTimeout
    }
}

/// flatdb Result type
pub type FlatDbResult<T> = Result<T, FlatDbError>;
