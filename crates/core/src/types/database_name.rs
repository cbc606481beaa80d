//! Validated PostgreSQL database name.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`DatabaseName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DatabaseNameError {
    /// The input string is empty.
    #[error("database name cannot be empty")]
    Empty,
    /// The name exceeds the engine's identifier limit.
    #[error("database name must be at most {max} bytes")]
    TooLong {
        /// Maximum allowed length in bytes.
        max: usize,
    },
    /// The name contains a NUL byte, which no identifier may hold.
    #[error("database name cannot contain NUL bytes")]
    ContainsNul,
}

/// The name of a database on the engine.
///
/// Names are passed to DDL as quoted identifiers, so any character except NUL
/// is allowed; the engine silently truncates identifiers longer than 63 bytes,
/// which is rejected here instead.
///
/// ```
/// use tienda_core::DatabaseName;
///
/// let name = DatabaseName::parse("tienda_db").unwrap();
/// assert_eq!(name.quoted(), "\"tienda_db\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatabaseName(String);

impl DatabaseName {
    /// Identifier length limit (`NAMEDATALEN - 1`).
    pub const MAX_LENGTH: usize = 63;

    /// Parse a `DatabaseName` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 63 bytes, or
    /// contains a NUL byte.
    pub fn parse(s: &str) -> Result<Self, DatabaseNameError> {
        if s.is_empty() {
            return Err(DatabaseNameError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(DatabaseNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.contains('\0') {
            return Err(DatabaseNameError::ContainsNul);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a double-quoted SQL identifier, with embedded quotes doubled.
    #[must_use]
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for DatabaseName {
    type Err = DatabaseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DatabaseName {
    type Error = DatabaseNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DatabaseName> for String {
    fn from(name: DatabaseName) -> Self {
        name.0
    }
}

impl AsRef<str> for DatabaseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
