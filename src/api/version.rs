//! REST API version selection.

use std::fmt;

/// Hint value that expands to every known version, newest first.
pub const AUTO: &str = "auto";

/// Versions tried, in order, for the `auto` hint.
const AUTO_VERSIONS: [&str; 2] = ["3", "2"];

/// Ordered list of REST API versions to try until one succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersions(Vec<String>);

impl ApiVersions {
    /// Build the list from a configuration hint.
    ///
    /// `"auto"` (any case) means v3 then v2; anything else is used verbatim.
    pub fn from_hint(hint: &str) -> Self {
        let hint = hint.trim();
        if hint.eq_ignore_ascii_case(AUTO) {
            Self(AUTO_VERSIONS.iter().map(|v| v.to_string()).collect())
        } else {
            Self(vec![hint.to_string()])
        }
    }

    /// Use an explicit ordered list.
    pub fn new(versions: Vec<String>) -> Self {
        Self(versions)
    }

    /// Iterate over the versions in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ApiVersions {
    fn default() -> Self {
        Self::from_hint(AUTO)
    }
}

impl fmt::Display for ApiVersions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}
