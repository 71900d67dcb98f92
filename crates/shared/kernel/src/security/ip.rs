use envcfg_domain::network::IpRange;
use std::net::Ipv4Addr;
use tracing::trace;

/// Converts a dotted-quad IPv4 string to its 32-bit big-endian integer form.
///
/// Only the strict four-part decimal grammar is accepted; anything else
/// (IPv6, hostnames, empty strings, shorthand like `10.1`) yields `None`.
#[must_use]
pub fn ip_to_u32(addr: &str) -> Option<u32> {
    addr.parse::<Ipv4Addr>().ok().map(u32::from)
}

/// An [`IpRange`] with both bounds converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedRange {
    pub low: u32,
    pub high: u32,
}

impl ParsedRange {
    /// Parses both bounds; `None` when either bound is not a valid IPv4 address.
    #[must_use]
    pub fn parse(range: &IpRange) -> Option<Self> {
        Some(Self { low: ip_to_u32(&range.low)?, high: ip_to_u32(&range.high)? })
    }

    /// Inclusive containment. An inverted range contains nothing.
    #[must_use]
    pub const fn contains(&self, ip: u32) -> bool {
        self.low <= ip && ip <= self.high
    }
}

/// Decides whether a remote address may trigger a configuration pass.
///
/// A pure predicate over a snapshot of the developer allowlist and the
/// configured ranges. Malformed input never errors, it just does not match.
#[derive(Debug, Clone, Default)]
pub struct IpMatcher {
    allowlist: Vec<String>,
    ranges: Vec<ParsedRange>,
}

impl IpMatcher {
    #[must_use]
    pub fn new(allowlist: Vec<String>, ranges: &[IpRange]) -> Self {
        let ranges = ranges
            .iter()
            .filter_map(|range| {
                let parsed = ParsedRange::parse(range);
                if parsed.is_none() {
                    trace!(low = %range.low, high = %range.high, "Ignoring unparsable IP range");
                }
                parsed
            })
            .collect();

        Self { allowlist, ranges }
    }

    /// `true` for an exact allowlist hit or an address inside any range.
    #[must_use]
    pub fn is_authorized(&self, remote_addr: &str) -> bool {
        if self.allowlist.iter().any(|ip| ip == remote_addr) {
            return true;
        }

        ip_to_u32(remote_addr).is_some_and(|ip| self.ranges.iter().any(|r| r.contains(ip)))
    }

    /// Ranges that survived parsing.
    #[must_use]
    pub fn ranges(&self) -> &[ParsedRange] {
        &self.ranges
    }
}
