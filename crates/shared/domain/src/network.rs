use serde::{Deserialize, Serialize};

/// Inclusive range of IPv4 addresses, kept in dotted-quad form as configured.
///
/// `low <= high` is the caller's responsibility; an inverted or unparsable
/// range simply never matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IpRange {
    pub low: String,
    pub high: String,
}

impl IpRange {
    #[must_use]
    pub fn new(low: impl Into<String>, high: impl Into<String>) -> Self {
        Self { low: low.into(), high: high.into() }
    }
}
