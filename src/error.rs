use thiserror::Error;

use crate::parse::ParseError;

/// Failure to load a configuration document.
///
/// Any of these aborts the whole load: no partial [`Document`](crate::Document)
/// is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("config '{name}' not found")]
    ConfigNotFound { name: String },

    #[error("failed to parse config '{config}': {source}")]
    Parse {
        config: String,
        #[source]
        source: ParseError,
    },

    #[error("cyclic include detected: {}", path.join(" -> "))]
    CyclicInclude { path: Vec<String> },

    #[error("failed to read config '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Name of the config the failure is attributed to.
    #[must_use]
    pub fn config_name(&self) -> &str {
        match self {
            LoadError::ConfigNotFound { name } | LoadError::Io { name, .. } => name,
            LoadError::Parse { config, .. } => config,
            LoadError::CyclicInclude { path } => path.last().map_or("", String::as_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_message() {
        let err = LoadError::ConfigNotFound {
            name: "vendor/extra".into(),
        };
        assert_eq!(err.to_string(), "config 'vendor/extra' not found");
        assert_eq!(err.config_name(), "vendor/extra");
    }

    #[test]
    fn cyclic_include_message() {
        let err = LoadError::CyclicInclude {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic include detected: a -> b -> a");
        assert_eq!(err.config_name(), "a");
    }

    #[test]
    fn parse_message_includes_config_and_rule() {
        let err = LoadError::Parse {
            config: "main".into(),
            source: ParseError::UnknownRule {
                rule: "archive(\"x\")".into(),
                kind: "archive".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "failed to parse config 'main': unknown rule kind 'archive' in archive(\"x\")"
        );
    }
}
