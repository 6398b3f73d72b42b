use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Name of a logical backing target, used to locate or start its execution unit.
///
/// A binding is never empty. Two equal bindings always address the same unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[non_exhaustive]
pub struct Binding(String);

impl Binding {
    /// Creates a `Binding` from any string-like value.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidBinding`] if the name is empty or
    /// whitespace-only, or has surrounding whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidBinding {
                name,
                reason: "must not be empty".to_owned(),
            });
        }
        if name.trim() != name {
            return Err(CoreError::InvalidBinding {
                name,
                reason: "must not have leading or trailing whitespace".to_owned(),
            });
        }
        Ok(Self(name))
    }

    /// Returns the binding name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Binding {
    type Error = CoreError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl TryFrom<&str> for Binding {
    type Error = CoreError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl From<Binding> for String {
    fn from(binding: Binding) -> Self {
        binding.0
    }
}

/// Identity of one execution unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub struct UnitId(pub Uuid);

impl UnitId {
    /// Creates a `UnitId` from 16 raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Returns the inner `Uuid`.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UnitId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
