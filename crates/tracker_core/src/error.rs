use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Malformed or missing input to a store operation.
    InvalidInput(String),
    /// An operation referenced an id that is not in the store.
    NotFound(u64),
    /// Stored data could not be parsed or failed structural validation.
    InvalidData(String),
    Io(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(id: u64) -> Self {
        Self::NotFound(id)
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput(message) => message.clone(),
            Self::NotFound(id) => format!("task {id} not found"),
            Self::InvalidData(message) => message.clone(),
            Self::Io(message) => message.clone(),
        }
    }

    /// Durable slot failures, either on read or on write.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::InvalidData(_) | Self::Io(_))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}
