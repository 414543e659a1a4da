use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorError {
    pub code: ErrorCode,
    pub message: String,
    pub context: BTreeMap<String, String>,
}
impl MirrorError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: BTreeMap::new(),
        }
    }
    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }
    pub fn aborted() -> Self {
        Self::new(ErrorCode::Aborted, "Aborted")
    }
    pub fn repository_not_found(path: &Path) -> Self {
        Self::new(ErrorCode::RepositoryNotFound, "Repository path not found")
            .with_context("path", &path.display().to_string())
    }
    pub fn io(operation: &str, path: &Path, err: &std::io::Error) -> Self {
        Self::new(ErrorCode::Io, format!("{} failed: {}", operation, err))
            .with_context("path", &path.display().to_string())
    }
    pub fn is_aborted(&self) -> bool {
        self.code == ErrorCode::Aborted
    }
}
impl std::fmt::Display for MirrorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.code == ErrorCode::Aborted {
            return f.write_str(&self.message);
        }
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(path) = self.context.get("path") {
            write!(f, " ({})", path)?;
        }
        Ok(())
    }
}
impl std::error::Error for MirrorError {}
/// Failure classes surfaced by the sync pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    RepositoryNotFound,
    MirrorUnavailable,
    Aborted,
    Io,
    WatcherUnavailable,
    InvalidConfiguration,
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn aborted_displays_bare_message() {
        assert_eq!(MirrorError::aborted().to_string(), "Aborted");
        assert!(MirrorError::aborted().is_aborted());
    }
    #[test]
    fn repository_error_carries_path() {
        let err = MirrorError::repository_not_found(Path::new("/mnt/photos"));
        assert_eq!(err.code, ErrorCode::RepositoryNotFound);
        assert_eq!(err.context.get("path").map(String::as_str), Some("/mnt/photos"));
        assert!(err.to_string().contains("/mnt/photos"));
    }
}
