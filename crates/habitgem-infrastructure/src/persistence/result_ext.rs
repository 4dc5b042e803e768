use habitgem_domain::shared::DomainError;

/// Extension trait for Result types to simplify error handling
pub trait ResultExt<T, E> {
    /// Convert error to DomainError::Infrastructure
    /// Usage: `result.to_infra_err()?`
    fn to_infra_err(self) -> Result<T, DomainError>;

    /// Convert error to DomainError::RemoteStore, prefixed with `context`
    fn to_remote_err(self, context: &str) -> Result<T, DomainError>;

    /// Convert error to DomainError::LocalCache, prefixed with `context`
    fn to_cache_err(self, context: &str) -> Result<T, DomainError>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn to_infra_err(self) -> Result<T, DomainError> {
        self.map_err(|e| DomainError::Infrastructure(e.to_string()))
    }

    fn to_remote_err(self, context: &str) -> Result<T, DomainError> {
        self.map_err(|e| DomainError::RemoteStore(format!("{}: {}", context, e)))
    }

    fn to_cache_err(self, context: &str) -> Result<T, DomainError> {
        self.map_err(|e| DomainError::LocalCache(format!("{}: {}", context, e)))
    }
}
