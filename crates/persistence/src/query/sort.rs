//! The sort compiler.
//!
//! Compiles the `sort` query parameter into an ordered list of
//! (field, direction) keys. The order of the input string is the
//! tie-break precedence of the result.

/// Sort direction for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Lowest first (the default).
    #[default]
    Ascending,
    /// Highest first.
    Descending,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// The field path to sort on.
    pub field: String,
    /// The direction.
    pub direction: SortDirection,
}

/// An ordered sort specification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// The no-sort specification: the store's natural order.
    pub fn natural() -> Self {
        Self::default()
    }

    /// Compiles a `sort` parameter value.
    ///
    /// Tokens are comma-separated; a `-` prefix means descending, a `+`
    /// prefix (or none) ascending. Blank tokens are skipped. `None` or a
    /// blank string yields the natural order.
    pub fn compile(input: Option<&str>) -> Self {
        let mut keys = Vec::new();

        if let Some(raw) = input {
            for token in raw.split(',').map(str::trim) {
                if token.is_empty() {
                    continue;
                }

                let (field, direction) = match token.strip_prefix('-') {
                    Some(rest) => (rest, SortDirection::Descending),
                    None => (
                        token.strip_prefix('+').unwrap_or(token),
                        SortDirection::Ascending,
                    ),
                };

                if field.is_empty() {
                    continue;
                }

                keys.push(SortKey {
                    field: field.to_string(),
                    direction,
                });
            }
        }

        Self { keys }
    }

    /// The keys in precedence order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Returns `true` if no sort was requested.
    pub fn is_natural(&self) -> bool {
        self.keys.is_empty()
    }
}
