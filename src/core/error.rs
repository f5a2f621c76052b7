//! Typed error handling for the generation pipeline
//!
//! Two fatal categories exist: configuration errors, raised before any
//! processing begins, and resolution errors, raised while walking the
//! registries. Fatal errors always abort before any document is
//! written. Non-fatal conditions (unresolvable entities, unencodable
//! option values, duplicate display names under the qualify policy)
//! are reported through the tracing channel instead.

use thiserror::Error;

/// The main error type for the jamgen pipeline
#[derive(Debug, Error)]
pub enum JamError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors in the configuration surface, raised before processing
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API prefix: a non-empty prefix is required")]
    MissingApiPrefix,

    #[error("cannot load metadata registry from {path}: {reason}")]
    UnresolvableRegistry { path: String, reason: String },
}

/// Errors raised while resolving registries into documents
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(
        "duplicate endpoint for singular name \"{single}\": routes \"{first}\" and \"{second}\""
    )]
    DuplicateEndpoint {
        single: String,
        first: String,
        second: String,
    },

    #[error("duplicate endpoint for entity \"{entity}\": routes \"{first}\" and \"{second}\"")]
    DuplicateEntity {
        entity: String,
        first: String,
        second: String,
    },

    #[error("duplicate model name \"{name}\" (apps \"{first_app}\" and \"{second_app}\")")]
    DuplicateModelName {
        name: String,
        first_app: String,
        second_app: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_endpoint_names_both_routes() {
        let err = ResolveError::DuplicateEndpoint {
            single: "widget".to_string(),
            first: "widgets".to_string(),
            second: "widgets-v2".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("widgets"));
        assert!(msg.contains("widgets-v2"));
        assert!(msg.contains("widget"));
    }

    #[test]
    fn test_config_error_converts_into_jam_error() {
        let err: JamError = ConfigError::MissingApiPrefix.into();
        assert!(matches!(err, JamError::Config(_)));
    }
}
