use std::{fmt, io};

/// Crate-wide `Result` type using [`AutocompleteError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, AutocompleteError>;

/// Top-level error type for autocomplete operations.
#[derive(Debug)]
pub enum AutocompleteError {
    /// Configuration errors.
    Config(ConfigError),

    /// Strategy construction errors.
    Strategy(StrategyError),

    /// I/O errors.
    Io(io::Error),

    /// Terminal setup or rendering errors.
    Terminal(String),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Missing required field.
    MissingField(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Two entries share a name that must be unique.
    Duplicate(String),

    /// Any other configuration problem.
    Generic(String),
}

/// Strategy-specific errors.
#[derive(Debug)]
pub enum StrategyError {
    /// Trigger pattern failed to compile.
    InvalidTrigger { strategy: String, message: String },

    /// Strategy referenced by name does not exist.
    NotFound(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for AutocompleteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutocompleteError::Config(e) => write!(f, "Configuration error: {e}"),
            AutocompleteError::Strategy(e) => write!(f, "Strategy error: {e}"),
            AutocompleteError::Io(e) => write!(f, "I/O error: {e}"),
            AutocompleteError::Terminal(msg) => write!(f, "Terminal error: {msg}"),
            AutocompleteError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Duplicate(name) => write!(f, "Duplicate entry: {name}"),
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for StrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyError::InvalidTrigger { strategy, message } => {
                write!(f, "Invalid trigger for strategy '{strategy}': {message}")
            }
            StrategyError::NotFound(name) => write!(f, "Strategy not found: {name}"),
        }
    }
}

impl std::error::Error for AutocompleteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AutocompleteError::Config(e) => Some(e),
            AutocompleteError::Strategy(e) => Some(e),
            AutocompleteError::Io(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for ConfigError {}
impl std::error::Error for StrategyError {}

/* ========================= Conversions to AutocompleteError ========================= */

impl From<io::Error> for AutocompleteError {
    fn from(err: io::Error) -> Self {
        AutocompleteError::Io(err)
    }
}

impl From<ConfigError> for AutocompleteError {
    fn from(err: ConfigError) -> Self {
        AutocompleteError::Config(err)
    }
}

impl From<StrategyError> for AutocompleteError {
    fn from(err: StrategyError) -> Self {
        AutocompleteError::Strategy(err)
    }
}

impl From<toml::de::Error> for AutocompleteError {
    fn from(err: toml::de::Error) -> Self {
        AutocompleteError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

impl From<toml::ser::Error> for AutocompleteError {
    fn from(err: toml::ser::Error) -> Self {
        AutocompleteError::Config(ConfigError::Generic(format!("Serialization failed: {err}")))
    }
}

impl From<serde_json::Error> for AutocompleteError {
    fn from(err: serde_json::Error) -> Self {
        AutocompleteError::Generic(format!("JSON error: {err}"))
    }
}

impl From<String> for AutocompleteError {
    fn from(msg: String) -> Self {
        AutocompleteError::Generic(msg)
    }
}

impl From<&str> for AutocompleteError {
    fn from(msg: &str) -> Self {
        AutocompleteError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = AutocompleteError::from(ConfigError::InvalidValue {
            field: "logging.level".into(),
            value: "loud".into(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid value 'loud' for field 'logging.level'"
        );
    }

    #[test]
    fn test_strategy_error_display() {
        let err = AutocompleteError::from(StrategyError::InvalidTrigger {
            strategy: "mention".into(),
            message: "unclosed group".into(),
        });
        assert!(err.to_string().contains("mention"));
        assert!(err.to_string().starts_with("Strategy error:"));
    }

    #[test]
    fn test_generic_from_str() {
        let err: AutocompleteError = "boom".into();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;

        let err = AutocompleteError::from(io::Error::new(io::ErrorKind::Other, "closed"));
        assert!(err.source().is_some());
        assert!(AutocompleteError::Terminal("x".into()).source().is_none());
    }
}
