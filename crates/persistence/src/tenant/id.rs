//! The tenant identifier type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TenantError;

/// An opaque tenant identifier.
///
/// The proxy treats the tenant as the isolation boundary: records are
/// created under exactly one tenant and, unless the caller is elevated,
/// queries only ever see records of the caller's own tenant.
///
/// # Examples
///
/// ```
/// use tickethub_persistence::tenant::TenantId;
///
/// let tenant = TenantId::new("acme");
/// assert_eq!(tenant.as_str(), "acme");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a tenant ID from the given string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds a tenant ID from a raw header value.
    ///
    /// An absent or blank value is an authorization failure; this is the
    /// single place the check happens, before any query is built.
    ///
    /// # Examples
    ///
    /// ```
    /// use tickethub_persistence::tenant::TenantId;
    ///
    /// assert!(TenantId::from_header(Some("acme")).is_ok());
    /// assert!(TenantId::from_header(Some("   ")).is_err());
    /// assert!(TenantId::from_header(None).is_err());
    /// ```
    pub fn from_header(value: Option<&str>) -> Result<Self, TenantError> {
        match value {
            Some(raw) if !raw.trim().is_empty() => Ok(Self::new(raw.trim())),
            _ => Err(TenantError::Missing),
        }
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is blank.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TenantId({})", self.0)
    }
}

impl FromStr for TenantId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TenantId::new(s))
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        TenantId::new(s)
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        TenantId::new(s)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
