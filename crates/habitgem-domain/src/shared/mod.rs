use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn from_string(s: &str) -> Self {
                Self(s.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from_string(value)
            }
        }
    };
}

define_id!(CategoryId);
define_id!(HabitId);
define_id!(OwnerId);
define_id!(BadgeId);

/// Day identity: creation timestamp in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayId(i64);

impl DayId {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for DayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Session (2xxx)
    OwnerNotSignedIn = 2002,

    // Data & Persistence (4xxx)
    LocalCacheError = 4002,
    DataIntegrityError = 4003,
    SerializationError = 4004,

    // Infrastructure (5xxx)
    InfrastructureError = 5001,
    RemoteStoreError = 5002,
    SubscriptionError = 5003,

    // Validation (6xxx)
    InvalidInput = 6002,
}

impl ErrorCode {
    /// Get error code as integer
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::OwnerNotSignedIn | ErrorCode::InvalidInput => ErrorSeverity::Info,

            ErrorCode::RemoteStoreError
            | ErrorCode::SubscriptionError
            | ErrorCode::SerializationError => ErrorSeverity::Warning,

            ErrorCode::DataIntegrityError
            | ErrorCode::LocalCacheError
            | ErrorCode::InfrastructureError => ErrorSeverity::Error,
        }
    }

    /// Remote failures are expected to converge on a later write or snapshot.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorCode::RemoteStoreError | ErrorCode::SubscriptionError
        )
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("No owner signed in: {0}")]
    OwnerNotSignedIn(String),

    #[error("Local cache error: {0}")]
    LocalCache(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("Remote store error: {0}")]
    RemoteStore(String),

    #[error("Subscription error: {0}")]
    Subscription(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DomainError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::OwnerNotSignedIn(_) => ErrorCode::OwnerNotSignedIn,
            DomainError::LocalCache(_) => ErrorCode::LocalCacheError,
            DomainError::DataIntegrity(_) => ErrorCode::DataIntegrityError,
            DomainError::Serialization(_) => ErrorCode::SerializationError,
            DomainError::Deserialization(_) => ErrorCode::SerializationError,
            DomainError::Infrastructure(_) => ErrorCode::InfrastructureError,
            DomainError::RemoteStore(_) => ErrorCode::RemoteStoreError,
            DomainError::Subscription(_) => ErrorCode::SubscriptionError,
            DomainError::InvalidInput(_) => ErrorCode::InvalidInput,
        }
    }

    /// Get error message
    pub fn message(&self) -> &str {
        match self {
            DomainError::OwnerNotSignedIn(msg)
            | DomainError::LocalCache(msg)
            | DomainError::DataIntegrity(msg)
            | DomainError::Serialization(msg)
            | DomainError::Deserialization(msg)
            | DomainError::Infrastructure(msg)
            | DomainError::RemoteStore(msg)
            | DomainError::Subscription(msg)
            | DomainError::InvalidInput(msg) => msg,
        }
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }

    /// Format error with code
    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}
