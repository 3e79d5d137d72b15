//! Domain error types.
//!
//! Only fatal conditions live here. Skipped actions and strategy/account
//! disagreements are reported as [`crate::domain::event::EngineEvent`]s and
//! never abort a run.

/// Top-level error type for replaytrader.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("bar source unavailable: {path}: {reason}")]
    SourceUnavailable { path: String, reason: String },

    #[error("corrupt bar source at line {line}: {reason}")]
    SourceCorrupt { line: u64, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReplayError {
    /// Shorthand for the `ConfigInvalid` variant.
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        ReplayError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(section: &str, key: &str) -> Self {
        ReplayError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(
            self,
            ReplayError::ConfigParse { .. }
                | ReplayError::ConfigMissing { .. }
                | ReplayError::ConfigInvalid { .. }
        )
    }
}

impl From<&ReplayError> for std::process::ExitCode {
    fn from(err: &ReplayError) -> Self {
        let code: u8 = match err {
            ReplayError::Io(_) => 1,
            ReplayError::ConfigParse { .. }
            | ReplayError::ConfigMissing { .. }
            | ReplayError::ConfigInvalid { .. } => 2,
            ReplayError::SourceUnavailable { .. } => 3,
            ReplayError::SourceCorrupt { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_display_names_section_and_key() {
        let err = ReplayError::invalid("engine", "initial_cash", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid config value [engine] initial_cash: must be positive"
        );
        assert!(err.is_config());
    }

    #[test]
    fn corrupt_display_includes_line() {
        let err = ReplayError::SourceCorrupt {
            line: 7,
            reason: "invalid close value".into(),
        };
        assert_eq!(
            err.to_string(),
            "corrupt bar source at line 7: invalid close value"
        );
        assert!(!err.is_config());
    }

    #[test]
    fn io_converts_transparently() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ReplayError = io.into();
        assert!(matches!(err, ReplayError::Io(_)));
        assert_eq!(err.to_string(), "gone");
    }
}
