//! Error types for movieinfo.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for movieinfo.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file is missing or unreadable
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration file content is malformed
    #[error("Failed to parse configuration file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// One or more field or business-rule violations
    #[error("Invalid configuration: {0}")]
    Validation(Violations),

    /// Log directory creation or file sink failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Violations carried by a validation error.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            Self::Validation(v) => Some(v),
            _ => None,
        }
    }
}

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A single violated field constraint or business rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the offending field, e.g. `database.port`
    pub field: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation found during one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(Violation {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// Whether any violation names `field`.
    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }

    /// `Ok(())` when empty, otherwise a validation error carrying the list.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_violations_is_ok() {
        assert!(Violations::new().into_result().is_ok());
    }

    #[test]
    fn test_violations_render_every_entry() {
        let mut violations = Violations::new();
        violations.push("app.port", "must be between 1 and 65535");
        violations.push("log.level", "must be one of: debug, info, warn, error");

        let err = violations.into_result().unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("app.port: must be between 1 and 65535"));
        assert!(rendered.contains("log.level: must be one of"));
        assert_eq!(err.violations().map(Violations::len), Some(2));
    }
}
