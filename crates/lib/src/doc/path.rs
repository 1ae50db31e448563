//! Path types for addressing values inside a document.
//!
//! A [`FieldPath`] is either a sequence of map keys (written dot-separated in
//! source form, `"user.profile.name"`) or the reserved same-level path, which
//! targets the enclosing map itself and is used by field-groups.
//!
//! # Usage
//!
//! ```rust
//! use docview::doc::FieldPath;
//!
//! // Parse from dotted text (automatically normalized)
//! let path = FieldPath::parse("user..profile.name.");
//! assert_eq!(path.to_string(), "user.profile.name");
//!
//! // Build incrementally
//! let path = FieldPath::root().push("user").push("profile");
//! assert_eq!(path.len(), 2);
//!
//! // The reserved token maps to the same-level path
//! assert!(FieldPath::parse("<same>").is_same_level());
//! ```

use std::{convert::Infallible, fmt, str::FromStr};

use thiserror::Error;

use crate::constants::{SAME_LEVEL, SAME_LEVEL_DEPTH, SEPARATOR};

/// Error type for path validation failures.
///
/// Parsing dotted text is infallible through normalization; only explicit
/// component validation can fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// Invalid component: contains a separator or the reserved token.
    #[error("Invalid component '{component}': {reason}")]
    InvalidComponent { component: String, reason: String },
}

impl From<PathError> for crate::Error {
    fn from(err: PathError) -> Self {
        crate::Error::Path(err)
    }
}

/// A validated single map key.
///
/// Components cannot contain the separator and cannot be the reserved
/// same-level token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Component {
    inner: String,
}

impl Component {
    /// Creates a new component from a string.
    ///
    /// # Errors
    /// Returns an error if the component contains a dot or equals the
    /// reserved same-level token.
    pub fn new(s: impl Into<String>) -> Result<Self, PathError> {
        let s = s.into();

        if s.contains(SEPARATOR) {
            return Err(PathError::InvalidComponent {
                component: s,
                reason: "components cannot contain dots".to_string(),
            });
        }
        if s == SAME_LEVEL {
            return Err(PathError::InvalidComponent {
                component: s,
                reason: "the same-level token is reserved".to_string(),
            });
        }

        Ok(Component { inner: s })
    }

    /// Returns the component as a string slice.
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl AsRef<str> for Component {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl FromStr for Component {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Component::new(s)
    }
}

impl TryFrom<&str> for Component {
    type Error = PathError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Component::new(s)
    }
}

/// Where a field's value lives inside a document.
///
/// A path is fixed for the lifetime of the field that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldPath {
    /// A sequence of map keys, outermost first. Empty means "invalid":
    /// reads yield nothing and writes are ignored.
    Keys(Vec<String>),
    /// The enclosing map itself.
    SameLevel,
}

impl FieldPath {
    /// The empty key path.
    pub fn root() -> Self {
        FieldPath::Keys(Vec::new())
    }

    /// The reserved same-level path.
    pub fn same_level() -> Self {
        FieldPath::SameLevel
    }

    /// Parses dotted text, normalizing empty components away.
    ///
    /// Text starting with the reserved token yields [`FieldPath::SameLevel`].
    pub fn parse(input: &str) -> Self {
        if input.starts_with(SAME_LEVEL) {
            return FieldPath::SameLevel;
        }
        FieldPath::Keys(
            input
                .split(SEPARATOR)
                .filter(|component| !component.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Builds a key path from individually validated components.
    pub fn from_components<I, C>(components: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let keys = components
            .into_iter()
            .map(|c| Component::new(c).map(|c| c.inner))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FieldPath::Keys(keys))
    }

    /// Appends dotted text to a key path. Same-level paths are returned
    /// unchanged since nothing can be nested under them.
    pub fn push(self, path: impl AsRef<str>) -> Self {
        match self {
            FieldPath::Keys(mut keys) => {
                keys.extend(
                    path.as_ref()
                        .split(SEPARATOR)
                        .filter(|c| !c.is_empty())
                        .map(str::to_string),
                );
                FieldPath::Keys(keys)
            }
            FieldPath::SameLevel => FieldPath::SameLevel,
        }
    }

    /// Returns true for the reserved same-level path.
    pub fn is_same_level(&self) -> bool {
        matches!(self, FieldPath::SameLevel)
    }

    /// The map keys of this path; empty for same-level paths.
    pub fn keys(&self) -> &[String] {
        match self {
            FieldPath::Keys(keys) => keys,
            FieldPath::SameLevel => &[],
        }
    }

    /// Returns an iterator over the key components.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.keys().iter().map(String::as_str)
    }

    /// Number of key components.
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    /// Returns `true` for an empty key path.
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldPath::Keys(keys) if keys.is_empty())
    }

    /// Depth used to order materialization: shallower paths fold first.
    pub fn depth(&self) -> usize {
        match self {
            FieldPath::Keys(keys) => keys.len(),
            FieldPath::SameLevel => SAME_LEVEL_DEPTH,
        }
    }

    /// Returns the parent key path, or `None` at the top level.
    pub fn parent(&self) -> Option<FieldPath> {
        match self {
            FieldPath::Keys(keys) if keys.len() > 1 => {
                Some(FieldPath::Keys(keys[..keys.len() - 1].to_vec()))
            }
            _ => None,
        }
    }

    /// Returns the last key, or `None` if there is none.
    pub fn last(&self) -> Option<&str> {
        self.keys().last().map(String::as_str)
    }
}

impl Default for FieldPath {
    fn default() -> Self {
        Self::root()
    }
}

impl FromStr for FieldPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FieldPath::parse(s))
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        FieldPath::parse(s)
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        FieldPath::parse(&s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::SameLevel => write!(f, "{SAME_LEVEL}"),
            FieldPath::Keys(keys) if keys.is_empty() => write!(f, "(empty path)"),
            FieldPath::Keys(keys) => write!(f, "{}", keys.join(".")),
        }
    }
}
