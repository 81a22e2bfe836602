//! Error types for variant generation.

use std::path::PathBuf;

use thiserror::Error;

use crate::image::EngineError;

pub type PlexResult<T> = Result<T, PlexError>;

/// Errors raised while building the variants of one asset.
#[derive(Debug, Error)]
pub enum PlexError {
    /// Invalid or unresolvable configuration. Aborts the asset.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("transform engine error: {0}")]
    Engine(#[from] EngineError),

    /// `inline` requested for a variant that produced no bytes.
    #[error("cannot inline `{name}`: no bytes were produced (synthetic mode?)")]
    InlineWithoutBytes { name: String },

    #[error("failed to read source `{}`", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to emit `{name}`")]
    Emit {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A failure located at one variant of one output request.
    #[error("variant #{index} of `{preset}` failed")]
    Variant {
        preset: String,
        index: usize,
        #[source]
        source: Box<PlexError>,
    },
}

impl PlexError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Attach the preset label and variant index to an error.
    pub fn at_variant(self, preset: impl Into<String>, index: usize) -> Self {
        Self::Variant {
            preset: preset.into(),
            index,
            source: Box::new(self),
        }
    }

    /// Whether the root cause is a configuration problem.
    pub fn is_config(&self) -> bool {
        match self {
            Self::Config(_) | Self::InlineWithoutBytes { .. } => true,
            Self::Variant { source, .. } => source.is_config(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert!(
            PlexError::config("bad")
                .to_string()
                .starts_with("configuration error:")
        );
        let inline = PlexError::InlineWithoutBytes {
            name: "a.jpg".into(),
        };
        assert!(inline.to_string().contains("a.jpg"));
    }

    #[test]
    fn test_variant_location_in_message() {
        let err = PlexError::config("unknown mode `fill`").at_variant("thumbnail", 3);
        let msg = err.to_string();
        assert!(msg.contains("#3"));
        assert!(msg.contains("thumbnail"));
        assert!(!msg.contains("unknown mode"));

        let cause = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(cause.as_deref(), Some("configuration error: unknown mode `fill`"));
        assert!(err.is_config());
    }

    #[test]
    fn test_alternate_chain_names_the_cause_once() {
        let err = PlexError::config("unknown mode `fill`").at_variant("thumbnail", 0);
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain.matches("unknown mode").count(), 1, "{chain}");
    }

    #[test]
    fn test_engine_error_is_not_config() {
        let err = PlexError::from(EngineError::Timeout(5)).at_variant("p", 0);
        assert!(!err.is_config());
    }
}
