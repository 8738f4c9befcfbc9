//! Request query parameters.
//!
//! [`QueryParams`] wraps the ordered (name, value) pairs of a request's
//! query string and gives typed access to the reserved control
//! parameters while leaving everything else to the filter compiler.

use std::collections::BTreeSet;

use crate::error::QueryError;

use super::sort::SortSpec;

/// Default page size when `limit` is absent.
pub const DEFAULT_LIMIT: u32 = 100;

/// Largest accepted `limit` value.
pub const MAX_LIMIT: u32 = 100;

/// The pagination window of a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Number of leading results to skip.
    pub offset: u64,
    /// Maximum number of results to return; zero disables the page
    /// while keeping the total count meaningful.
    pub limit: u32,
}

/// The ordered query parameters of one request.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Wraps an already-decoded parameter list.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// Parses a raw query string (`a=1&b=2`), percent-decoded.
    ///
    /// # Examples
    ///
    /// ```
    /// use tickethub_persistence::query::QueryParams;
    ///
    /// let params = QueryParams::parse("name[=~]=%5ET&limit=10");
    /// assert_eq!(params.first("limit"), Some("10"));
    /// ```
    pub fn parse(query: &str) -> Self {
        let pairs = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    /// All pairs, in request order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// The first value of the named parameter.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value of the named parameter, in request order.
    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.pairs
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The pagination window, validated.
    ///
    /// # Errors
    ///
    /// [`QueryError::InvalidParameter`] on unparseable numbers,
    /// [`QueryError::OutOfRange`] when `limit` exceeds [`MAX_LIMIT`].
    pub fn page(&self) -> Result<PageRequest, QueryError> {
        let limit = match self.first("limit") {
            None => DEFAULT_LIMIT,
            Some(raw) => {
                let value: u32 = raw.parse().map_err(|_| QueryError::InvalidParameter {
                    name: "limit",
                    value: raw.to_string(),
                })?;
                if value > MAX_LIMIT {
                    return Err(QueryError::OutOfRange {
                        name: "limit",
                        value: i64::from(value),
                        min: 0,
                        max: i64::from(MAX_LIMIT),
                    });
                }
                value
            }
        };

        let offset = match self.first("offset") {
            None => 0,
            Some(raw) => raw.parse().map_err(|_| QueryError::InvalidParameter {
                name: "offset",
                value: raw.to_string(),
            })?,
        };

        Ok(PageRequest { offset, limit })
    }

    /// The compiled sort specification.
    pub fn sort(&self) -> SortSpec {
        SortSpec::compile(self.first("sort"))
    }

    /// The union of all requested output fields.
    ///
    /// Each `fields` occurrence may itself be comma-separated; blanks
    /// are dropped. An empty set means no projection.
    pub fn fields(&self) -> BTreeSet<String> {
        self.all("fields")
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}
