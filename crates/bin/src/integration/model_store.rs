//! Model artifact location.
//!
//! The model is looked up, in order, from the `--model` flag, the
//! `RETAIN_MODEL` environment variable (both handled by clap) and a
//! platform-specific data directory.

use retain::{ChurnService, ServiceError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors opening the model store.
#[derive(Debug, Error)]
pub(crate) enum ModelStoreError {
    /// No artifact at the resolved location.
    #[error(
        "no model artifact at {}; pass --model <PATH> or set RETAIN_MODEL",
        .0.display()
    )]
    NotFound(PathBuf),

    /// Artifact present but unusable.
    #[error("failed to load model from {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ServiceError,
    },
}

/// Get the default model directory path.
///
/// Uses platform-specific data directories:
/// - Linux: `~/.local/share/retain/`
/// - macOS: `~/Library/Application Support/retain/`
/// - Windows: `%APPDATA%\retain\`
pub(crate) fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("retain")
}

/// Get the default model artifact path.
pub(crate) fn default_model_path() -> PathBuf {
    default_model_dir().join("model.json")
}

/// Resolve the artifact path, falling back to the default location.
pub(crate) fn resolve_model_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(default_model_path, Path::to_path_buf)
}

/// Open a service with the model at `path` loaded.
pub(crate) fn open_service(path: &Path) -> Result<ChurnService, ModelStoreError> {
    if !path.exists() {
        return Err(ModelStoreError::NotFound(path.to_path_buf()));
    }

    let service =
        ChurnService::from_model_path(path).map_err(|source| ModelStoreError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), "model loaded");
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path() {
        let path = default_model_path();
        assert!(path.ends_with("retain/model.json"));
    }

    #[test]
    fn test_explicit_path_wins() {
        let explicit = PathBuf::from("/srv/models/churn.json");
        assert_eq!(resolve_model_path(Some(&explicit)), explicit);
        assert_eq!(resolve_model_path(None), default_model_path());
    }

    #[test]
    fn test_missing_artifact() {
        let err = open_service(Path::new("/nonexistent/retain/model.json")).unwrap_err();
        assert!(matches!(err, ModelStoreError::NotFound(_)));
        assert!(err.to_string().contains("RETAIN_MODEL"));
    }

    #[test]
    fn test_demo_artifact_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/model.json");
        let service = open_service(&path).unwrap();
        assert!(service.handle().is_loaded());
    }
}
